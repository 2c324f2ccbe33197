//! # 同步引擎
//!
//! 根据播放时间计算当前行、间奏状态和逐字进度。
//!
//! [`evaluate`] 是纯函数：上一次的当前行由调用方传入，新的状态作为返回值。
//! 需要自动保存状态时使用 [`SyncSession`]。

mod gap;
mod progress;
mod session;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::SyncConfig;
use crate::types::ParsedLyrics;

pub use progress::{syllable_progress, word_progress};
pub use session::SyncSession;

/// 某一时刻的同步状态。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// 当前行的下标，还没有任何行开始时为 `None`
    pub active_line_index: Option<usize>,
    /// 是否处在间奏中
    pub is_in_gap: bool,
    /// 间奏动画进度，范围 `[0, 1]`
    pub gap_progress: f64,
    /// 距下一行开始的秒数，只在间奏中有意义
    pub gap_time_remaining: f64,
    /// 当前行每个词的高亮进度，范围 `[0, 1]`
    pub word_progress: Vec<f64>,
}

impl SyncState {
    /// 第 `index` 个词是否已经唱完。
    #[must_use]
    pub fn is_word_complete(&self, index: usize) -> bool {
        self.word_progress.get(index).is_some_and(|&p| p >= 1.0)
    }
}

/// 使用默认阈值计算 `current_time` 时的同步状态。
#[must_use]
pub fn evaluate(
    doc: &ParsedLyrics,
    current_time: f64,
    prev_active_line_index: Option<usize>,
) -> SyncState {
    evaluate_with_config(doc, current_time, prev_active_line_index, &SyncConfig::default())
}

/// 计算 `current_time` 时的同步状态。
///
/// 当前行只会向前移动；只有回退超过 `seek_tolerance` 秒时才认为是用户拖动了进度条。
#[must_use]
pub fn evaluate_with_config(
    doc: &ParsedLyrics,
    current_time: f64,
    prev_active_line_index: Option<usize>,
    config: &SyncConfig,
) -> SyncState {
    if !doc.synced || doc.lines.is_empty() {
        return SyncState::default();
    }
    let lines = &doc.lines;

    // 最后一个已经开始的行
    let candidate = lines
        .partition_point(|l| l.time <= current_time)
        .checked_sub(1);

    // 越界的旧下标（文档已更换）直接忽略
    let prev = prev_active_line_index.filter(|&i| i < lines.len());
    let active_line_index = match prev {
        Some(prev_idx) if candidate < Some(prev_idx) => {
            if lines[prev_idx].time - current_time > config.seek_tolerance {
                candidate
            } else {
                Some(prev_idx)
            }
        }
        _ => candidate,
    };

    let Some(active_idx) = active_line_index else {
        trace!("{current_time:.3}s: 尚无当前行");
        return SyncState::default();
    };
    let line = &lines[active_idx];

    let gap_status = lines
        .get(active_idx + 1)
        .map(|next| gap::detect_gap(line, next, current_time, config))
        .unwrap_or_default();

    let word_progress = line
        .words
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|w| progress::word_progress(w, current_time, config.default_word_duration))
        .collect();

    trace!(
        "{current_time:.3}s: 当前行 #{active_idx}, 间奏 {} ({:.2})",
        gap_status.in_gap,
        gap_status.progress
    );

    SyncState {
        active_line_index,
        is_in_gap: gap_status.in_gap,
        gap_progress: gap_status.progress,
        gap_time_remaining: if gap_status.in_gap {
            gap_status.time_remaining
        } else {
            0.0
        },
        word_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LyricsFormat, LyricsLine, LyricsWord};

    fn doc(times: &[f64]) -> ParsedLyrics {
        ParsedLyrics {
            synced: true,
            lines: times
                .iter()
                .map(|&t| LyricsLine::new(t, format!("line at {t}")))
                .collect(),
            format: LyricsFormat::Lrc,
            ..Default::default()
        }
    }

    #[test]
    fn test_unsynced_or_empty_is_inactive() {
        let mut plain = doc(&[0.0, 1.0]);
        plain.synced = false;
        assert_eq!(evaluate(&plain, 5.0, None), SyncState::default());
        assert_eq!(evaluate(&ParsedLyrics::default(), 5.0, Some(3)), SyncState::default());
    }

    #[test]
    fn test_active_line_is_last_started() {
        let d = doc(&[1.0, 5.0, 10.0]);
        assert_eq!(evaluate(&d, 0.5, None).active_line_index, None);
        assert_eq!(evaluate(&d, 1.0, None).active_line_index, Some(0));
        assert_eq!(evaluate(&d, 7.0, None).active_line_index, Some(1));
        assert_eq!(evaluate(&d, 100.0, None).active_line_index, Some(2));
    }

    #[test]
    fn test_seek_tolerance_boundary() {
        let d = doc(&[0.0, 5.0, 10.0]);
        assert_eq!(evaluate(&d, 8.5, Some(2)).active_line_index, Some(2));
        assert_eq!(evaluate(&d, 7.9, Some(2)).active_line_index, Some(1));
    }

    #[test]
    fn test_forward_only_without_large_seek() {
        let d = doc(&[0.0, 5.0, 10.0]);
        let mut prev = None;
        for t in [0.0, 4.0, 5.5, 9.9, 10.1, 9.0, 8.5, 11.0] {
            let state = evaluate(&d, t, prev);
            if let (Some(p), Some(a)) = (prev, state.active_line_index) {
                assert!(a >= p, "在 {t}s 时从 {p} 回退到了 {a}");
            }
            prev = state.active_line_index;
        }
        assert_eq!(prev, Some(2));
    }

    #[test]
    fn test_seek_before_first_line_clears_active() {
        let d = doc(&[5.0, 10.0]);
        assert_eq!(evaluate(&d, 1.0, Some(1)).active_line_index, None);
        assert_eq!(evaluate(&d, 4.0, Some(0)).active_line_index, Some(0));
    }

    #[test]
    fn test_stale_prev_index_is_ignored() {
        let d = doc(&[0.0, 5.0]);
        assert_eq!(evaluate(&d, 1.0, Some(7)).active_line_index, Some(0));
    }

    #[test]
    fn test_gap_scenario() {
        let mut d = doc(&[10.0, 18.0]);
        d.format = LyricsFormat::Srt;
        d.lines[0].end_time = Some(12.0);

        let state = evaluate(&d, 12.1, Some(0));
        assert_eq!(state.active_line_index, Some(0));
        assert!(state.is_in_gap);
        assert!(state.gap_progress < 0.05);
        assert!((state.gap_time_remaining - 5.9).abs() < 1e-9);

        let state = evaluate(&d, 16.9, Some(0));
        assert!(!state.is_in_gap);
        assert!((state.gap_time_remaining - 0.0).abs() < f64::EPSILON);

        let state = evaluate(&d, 11.0, Some(0));
        assert!(!state.is_in_gap);
    }

    #[test]
    fn test_lrc_lines_never_gap() {
        let d = doc(&[10.0, 30.0]);
        assert!(!evaluate(&d, 20.0, None).is_in_gap);
    }

    #[test]
    fn test_word_progress_for_active_line() {
        let mut d = doc(&[1.0, 10.0]);
        d.lines[0].words = Some(vec![
            LyricsWord {
                time: 1.0,
                end_time: Some(2.0),
                text: "a".to_string(),
                syllables: None,
                transliteration: None,
            },
            LyricsWord {
                time: 2.0,
                end_time: None,
                text: "b".to_string(),
                syllables: None,
                transliteration: None,
            },
        ]);

        let state = evaluate(&d, 1.5, None);
        assert_eq!(state.word_progress.len(), 2);
        assert!((state.word_progress[0] - 0.5).abs() < 1e-9);
        assert!((state.word_progress[1] - 0.0).abs() < 1e-9);
        assert!(!state.is_word_complete(0));

        let state = evaluate(&d, 2.5, Some(0));
        assert!(state.is_word_complete(0));
        assert!(state.is_word_complete(1));
        assert!(!state.is_word_complete(5));
    }

    #[test]
    fn test_custom_config() {
        let d = doc(&[0.0, 5.0, 10.0]);
        let config = SyncConfig {
            seek_tolerance: 1.0,
            ..SyncConfig::default()
        };
        assert_eq!(
            evaluate_with_config(&d, 8.5, Some(2), &config).active_line_index,
            Some(1)
        );
    }
}
