//! # SRT 格式解析器

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::converter::utils::normalize_text_whitespace;
use crate::types::{LyricsFormat, LyricsLine, ParsedLyrics};

/// 匹配 `00:00:01,000 --> 00:00:02,500` 这样的时间行
pub(crate) static SRT_TIMING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})",
    )
    .expect("未能编译 SRT_TIMING_REGEX")
});

/// 块与块之间的空行
static BLANK_LINE_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("未能编译 BLANK_LINE_SPLIT_REGEX"));

/// 字幕中常见的格式标签，例如 `<i>`、`<font color="...">`、`{\an8}`
static FORMATTING_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>|\{\\[^}]*}").expect("未能编译 FORMATTING_TAG_REGEX"));

/// 解析 SRT 格式内容到 `ParsedLyrics` 结构。
#[must_use]
pub fn parse_srt(content: &str) -> ParsedLyrics {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines: Vec<LyricsLine> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for (block_idx, block) in BLANK_LINE_SPLIT_REGEX.split(content).enumerate() {
        if block.trim().is_empty() {
            continue;
        }
        match parse_block(block) {
            Some(line) => lines.push(line),
            None => {
                debug!("跳过第 {} 个 SRT 块: 缺少时间行或文本为空", block_idx + 1);
                warnings.push(format!("SRT 块 #{} 无效，已忽略。", block_idx + 1));
            }
        }
    }

    let mut parsed = ParsedLyrics {
        synced: !lines.is_empty(),
        lines,
        format: LyricsFormat::Srt,
        warnings,
        ..Default::default()
    };
    parsed.sort_lines();
    parsed
}

fn parse_block(block: &str) -> Option<LyricsLine> {
    let mut block_lines = block.lines();
    let mut timing = None;

    // 时间行之前的内容（序号）直接丢弃
    for raw_line in block_lines.by_ref() {
        if let Some(caps) = SRT_TIMING_REGEX.captures(raw_line) {
            timing = Some((
                seconds_from_captures(&caps, 1)?,
                seconds_from_captures(&caps, 5)?,
            ));
            break;
        }
    }
    let (start, end) = timing?;

    let joined = block_lines
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let text = normalize_text_whitespace(&FORMATTING_TAG_REGEX.replace_all(&joined, ""));
    if text.is_empty() {
        return None;
    }

    Some(LyricsLine {
        end_time: Some(end),
        ..LyricsLine::new(start, text)
    })
}

fn seconds_from_captures(caps: &regex::Captures<'_>, first_group: usize) -> Option<f64> {
    let hours: u64 = caps[first_group].parse().ok()?;
    let minutes: u64 = caps[first_group + 1].parse().ok()?;
    let seconds: u64 = caps[first_group + 2].parse().ok()?;
    let millis: u64 = caps[first_group + 3].parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}
