//! 单个播放会话的同步状态。

use std::sync::Arc;

use tracing::debug;

use super::{SyncState, evaluate_with_config};
use crate::config::SyncConfig;
use crate::types::ParsedLyrics;

/// 持有一份歌词文档和上一次的当前行。
///
/// 一个会话只属于一个播放器；多个会话可以通过 `Arc` 共享同一份文档。
#[derive(Debug, Clone)]
pub struct SyncSession {
    doc: Arc<ParsedLyrics>,
    config: SyncConfig,
    prev_active_line_index: Option<usize>,
}

impl SyncSession {
    #[must_use]
    pub fn new(doc: Arc<ParsedLyrics>) -> Self {
        Self::with_config(doc, SyncConfig::default())
    }

    #[must_use]
    pub const fn with_config(doc: Arc<ParsedLyrics>, config: SyncConfig) -> Self {
        Self {
            doc,
            config,
            prev_active_line_index: None,
        }
    }

    /// 计算 `current_time` 时的状态，并记住新的当前行。
    pub fn update(&mut self, current_time: f64) -> SyncState {
        let state = evaluate_with_config(
            &self.doc,
            current_time,
            self.prev_active_line_index,
            &self.config,
        );
        self.prev_active_line_index = state.active_line_index;
        state
    }

    /// 更换文档。不是同一份文档时重置状态。
    pub fn set_document(&mut self, doc: Arc<ParsedLyrics>) {
        if Arc::ptr_eq(&self.doc, &doc) {
            return;
        }
        debug!("歌词文档已更换，重置同步状态");
        self.doc = doc;
        self.prev_active_line_index = None;
    }

    /// 清除上一次的当前行，例如切换歌曲或停止播放时。
    pub const fn reset(&mut self) {
        self.prev_active_line_index = None;
    }

    #[must_use]
    pub fn document(&self) -> &ParsedLyrics {
        &self.doc
    }

    #[must_use]
    pub const fn active_line_index(&self) -> Option<usize> {
        self.prev_active_line_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LyricsFormat, LyricsLine};

    fn shared_doc(times: &[f64]) -> Arc<ParsedLyrics> {
        Arc::new(ParsedLyrics {
            synced: true,
            lines: times.iter().map(|&t| LyricsLine::new(t, "x")).collect(),
            format: LyricsFormat::Lrc,
            ..Default::default()
        })
    }

    #[test]
    fn test_session_remembers_active_line() {
        let mut session = SyncSession::new(shared_doc(&[0.0, 5.0, 10.0]));
        assert_eq!(session.update(10.5).active_line_index, Some(2));
        // 小幅回退保持不变
        assert_eq!(session.update(9.0).active_line_index, Some(2));
        assert_eq!(session.active_line_index(), Some(2));
    }

    #[test]
    fn test_set_document_resets_unless_same() {
        let doc = shared_doc(&[0.0, 5.0, 10.0]);
        let mut session = SyncSession::new(Arc::clone(&doc));
        session.update(10.5);

        session.set_document(Arc::clone(&doc));
        assert_eq!(session.active_line_index(), Some(2));

        session.set_document(shared_doc(&[0.0, 5.0, 10.0]));
        assert_eq!(session.active_line_index(), None);
        // 重置后不再受旧状态影响
        assert_eq!(session.update(9.0).active_line_index, Some(1));
    }

    #[test]
    fn test_reset() {
        let mut session = SyncSession::new(shared_doc(&[0.0, 5.0, 10.0]));
        session.update(10.5);
        session.reset();
        assert_eq!(session.active_line_index(), None);
        assert_eq!(session.document().lines.len(), 3);
    }
}
