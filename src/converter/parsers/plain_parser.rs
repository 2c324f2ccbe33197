//! # 纯文本解析器
//!
//! 没有任何时间信息的歌词，每个非空行用行号作为伪时间。

use crate::types::{LyricsFormat, LyricsLine, ParsedLyrics};

/// 解析纯文本歌词。结果总是 `synced == false`。
#[must_use]
pub fn parse_plain(content: &str) -> ParsedLyrics {
    let lines: Vec<LyricsLine> = content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(idx, text)| LyricsLine::new(idx as f64, text))
        .collect();

    ParsedLyrics {
        synced: false,
        lines,
        format: LyricsFormat::Plain,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_use_index_as_time() {
        let parsed = parse_plain("first\n\n  second  \n");
        assert!(!parsed.synced);
        assert_eq!(parsed.format, LyricsFormat::Plain);
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[1].text, "second");
        assert!((parsed.lines[1].time - 1.0).abs() < f64::EPSILON);
    }
}
