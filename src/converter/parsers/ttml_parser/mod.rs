//! # TTML (Timed Text Markup Language) 解析器
//!
//! 该解析器用于解析 Apple Music 风格的逐字 TTML 歌词，
//! 不建议用于解析通用的 TTML 字幕文件。

mod body;
mod constants;
mod handlers;
mod metadata;
mod state;
mod utils;

use quick_xml::{Reader, errors::Error as QuickXmlError, events::Event};
use tracing::{debug, error, warn};

use self::state::TtmlParserState;
use crate::config::ParsingOptions;
use crate::error::LyricsError;
use crate::types::{LyricsFormat, LyricsLine, ParsedLyrics};

/// 解析 TTML 格式的歌词文件。
///
/// # 参数
///
/// * `content` - TTML 格式的歌词文件内容字符串。
/// * `options` - 解析选项，目前只包含音译匹配的时间容差。
///
/// # 返回
///
/// * `Ok(ParsedLyrics)` - 解析结果。格式错误的属性、时间戳和可恢复的 XML 错误只会产生警告。
/// * `Err(LyricsError)` - 无法继续读取 XML 时返回。
///
/// # Errors
///
/// * `LyricsError::Xml` - 遇到无法恢复的 XML 读取错误时
/// * `LyricsError::Encoding` - 文本无法解码时
pub fn parse_ttml(content: &str, options: &ParsingOptions) -> Result<ParsedLyrics, LyricsError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut lines: Vec<LyricsLine> = Vec::with_capacity(content.matches("<p").count());

    // 没有 <tt itunes:timing> 时，根据是否存在计时 span 推断
    let mut state = TtmlParserState {
        word_timing_declared: handlers::has_timed_span_tags(content),
        ..Default::default()
    };
    let mut buf = Vec::new();

    loop {
        let position_before = reader.buffer_position();
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => {
                // 尝试抢救数据
                if let QuickXmlError::IllFormed(_) = e {
                    handlers::attempt_recovery_from_error(&mut state, &reader, &mut lines, &e);
                    if reader.buffer_position() == position_before {
                        warn!("TTML 解析在位置 {position_before} 无法继续，停止解析");
                        break;
                    }
                    buf.clear();
                    continue;
                }

                error!(
                    "TTML 解析错误，位置 {}: {}。无法继续解析",
                    reader.error_position(),
                    e
                );
                return Err(LyricsError::Xml(e));
            }
        };

        if matches!(event, Event::Eof) {
            break;
        }

        if state.in_metadata {
            metadata::handle_metadata_event(&event, &reader, &mut state)?;
        } else if state.body_state.in_p {
            body::handle_p_event(&event, &mut state, &reader, &mut lines)?;
        } else {
            handlers::handle_global_event(&event, &mut state, &reader)?;
        }

        buf.clear();
    }

    // 文档在 <p> 中途结束时，保留已经解析的部分
    if state.body_state.in_p {
        state
            .warnings
            .push("TTML 文档在 <p> 元素内部意外结束。".to_string());
        body::handle_p_end(&mut state, &mut lines);
    }

    if lines.is_empty() && !state.loose_lines.is_empty() {
        debug!(
            "没有找到 <p> 行，使用 {} 个顶层计时 span 作为歌词行",
            state.loose_lines.len()
        );
        lines = std::mem::take(&mut state.loose_lines);
    }

    let word_timed_lines = lines.iter().filter(|l| l.has_words()).count();
    let mut parsed = ParsedLyrics {
        synced: !lines.is_empty(),
        has_word_timing: state.word_timing_declared && word_timed_lines > 0,
        lines,
        format: LyricsFormat::Ttml,
        metadata: state.metadata,
        warnings: state.warnings,
        ..Default::default()
    };
    parsed.sort_lines();
    parsed.has_translation = parsed.lines.iter().any(|l| l.translation.is_some());
    if parsed.has_translation {
        parsed.translation_language = state.inline_translation_language;
    }

    let meta_state = state.metadata_state;
    metadata::apply_translations(&mut parsed, meta_state.translations);
    metadata::apply_transliterations(
        &mut parsed,
        meta_state.transliterations,
        options.transliteration_tolerance,
    );
    if !meta_state.songwriters.is_empty() {
        parsed.songwriters = Some(meta_state.songwriters);
    }

    debug!(
        "TTML 解析完成: {} 行, 其中 {} 行带逐字时间, {} 条警告",
        parsed.lines.len(),
        word_timed_lines,
        parsed.warnings.len()
    );
    Ok(parsed)
}
