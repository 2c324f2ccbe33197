//! # 歌词转换
//!
//! 格式嗅探、各格式解析器以及翻译合并。

pub mod merger;
pub mod parsers;
pub mod sniffer;
pub mod utils;

use tracing::{debug, warn};

use crate::config::ParsingOptions;
use crate::types::{LyricsFormat, ParsedLyrics};

pub use merger::{merge_all, merge_text_as_translation, merge_translations};
pub use sniffer::detect_format;

/// 解析歌词文本，格式由 `hint`（路径、文件名或扩展名）或内容推断。
///
/// 该函数不会失败：无法解析的输入会得到一个空的、未同步的文档。
#[must_use]
pub fn parse(content: &str, hint: Option<&str>) -> ParsedLyrics {
    parse_with_options(content, hint, &ParsingOptions::default())
}

/// 与 [`parse`] 相同，但可以指定解析选项。
#[must_use]
pub fn parse_with_options(
    content: &str,
    hint: Option<&str>,
    options: &ParsingOptions,
) -> ParsedLyrics {
    let format = detect_format(content, hint);
    debug!("以 {format} 格式解析歌词 ({} 字节)", content.len());

    match format {
        LyricsFormat::Lrc => parsers::parse_lrc(content),
        LyricsFormat::Srt => parsers::parse_srt(content),
        LyricsFormat::Plain => parsers::parse_plain(content),
        LyricsFormat::Ttml => parsers::parse_ttml(content, options).unwrap_or_else(|e| {
            warn!("TTML 解析失败: {e}");
            let mut parsed = ParsedLyrics::empty(LyricsFormat::Ttml);
            parsed.warnings.push(format!("TTML 解析失败: {e}"));
            parsed
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_content() {
        let parsed = parse("[00:01.50]hello", None);
        assert_eq!(parsed.format, LyricsFormat::Lrc);
        assert!(parsed.synced);
        assert_eq!(parsed.lines[0].text, "hello");

        let parsed = parse("line one\nline two", None);
        assert_eq!(parsed.format, LyricsFormat::Plain);
        assert!(!parsed.synced);
        assert_eq!(parsed.lines.len(), 2);
    }

    #[test]
    fn test_dispatch_by_hint() {
        let parsed = parse("[00:01.50]hello", Some("lyrics.txt"));
        assert_eq!(parsed.format, LyricsFormat::Plain);
        assert_eq!(parsed.lines[0].text, "[00:01.50]hello");
    }

    #[test]
    fn test_empty_input_never_fails() {
        for hint in [None, Some("a.lrc"), Some("a.srt"), Some("a.ttml"), Some("a.txt")] {
            let parsed = parse("", hint);
            assert!(parsed.is_empty());
            assert!(!parsed.synced);
        }
    }
}
