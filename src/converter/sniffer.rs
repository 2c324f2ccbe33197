//! # 格式嗅探
//!
//! 先看扩展名提示，提示缺失或无法识别时再检查内容。

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::converter::parsers::srt_parser::SRT_TIMING_REGEX;
use crate::types::LyricsFormat;

/// 行首的 `[MM:SS.CC]` 时间标签
static LRC_LINE_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\d{2,}:\d{2}[.:]\d{2,3}]").expect("未能编译 LRC_LINE_START_REGEX")
});

const TTML_NAMESPACE: &str = "http://www.w3.org/ns/ttml";

/// 判断歌词内容的格式。
///
/// `hint` 可以是路径、文件名或单独的扩展名，比较时不区分大小写。
#[must_use]
pub fn detect_format(content: &str, hint: Option<&str>) -> LyricsFormat {
    if let Some(format) = hint.and_then(format_from_hint) {
        trace!("根据扩展名提示 {hint:?} 判断为 {format}");
        return format;
    }
    sniff_content(content)
}

fn format_from_hint(hint: &str) -> Option<LyricsFormat> {
    let hint = hint.trim();
    let ext = hint.rsplit_once('.').map_or(hint, |(_, ext)| ext);
    LyricsFormat::from_extension(ext)
}

fn sniff_content(content: &str) -> LyricsFormat {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    if content.starts_with("<?xml")
        || content.starts_with("<tt")
        || content.contains("<tt ")
        || content.contains("<tt>")
        || content.contains(TTML_NAMESPACE)
    {
        return LyricsFormat::Ttml;
    }

    let mut non_blank = content.lines().map(str::trim).filter(|l| !l.is_empty());
    if let (Some(first), Some(second)) = (non_blank.next(), non_blank.next())
        && first.chars().all(|c| c.is_ascii_digit())
        && SRT_TIMING_REGEX.is_match(second)
    {
        return LyricsFormat::Srt;
    }

    if content
        .lines()
        .any(|line| LRC_LINE_START_REGEX.is_match(line.trim_start()))
    {
        return LyricsFormat::Lrc;
    }

    LyricsFormat::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wins_over_content() {
        assert_eq!(detect_format("whatever", Some("song.LRC")), LyricsFormat::Lrc);
        assert_eq!(detect_format("", Some("/music/a.b/song.srt")), LyricsFormat::Srt);
        assert_eq!(detect_format("", Some("ttml")), LyricsFormat::Ttml);
        assert_eq!(detect_format("", Some("lyrics.xml")), LyricsFormat::Ttml);
        assert_eq!(
            detect_format("[00:01.00]x", Some("notes.txt")),
            LyricsFormat::Plain
        );
    }

    #[test]
    fn test_unknown_hint_falls_back_to_sniffing() {
        assert_eq!(
            detect_format("[00:01.50]hello", Some("song.mp3")),
            LyricsFormat::Lrc
        );
    }

    #[test]
    fn test_sniff_content() {
        assert_eq!(detect_format("[00:01.50]hello", None), LyricsFormat::Lrc);
        assert_eq!(
            detect_format("[ti:Title]\n[ar:Artist]\n[00:01.50]hello", None),
            LyricsFormat::Lrc
        );
        assert_eq!(
            detect_format("\u{feff}<?xml version=\"1.0\"?><tt></tt>", None),
            LyricsFormat::Ttml
        );
        assert_eq!(
            detect_format("<tt xmlns=\"http://www.w3.org/ns/ttml\"></tt>", None),
            LyricsFormat::Ttml
        );
        assert_eq!(
            detect_format("1\n00:00:01,000 --> 00:00:02,000\nhi\n", None),
            LyricsFormat::Srt
        );
        assert_eq!(detect_format("just\nsome words", None), LyricsFormat::Plain);
        assert_eq!(detect_format("", None), LyricsFormat::Plain);
    }
}
