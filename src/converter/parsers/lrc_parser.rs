//! # LRC 格式解析器

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::converter::utils::normalize_text_whitespace;
use crate::types::{LyricsFormat, LyricsLine, ParsedLyrics};

/// 用于匹配一个完整的 LRC 歌词行，捕获时间戳部分和文本部分
static LRC_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d{2,}:\d{2}[.:]\d{2,3}])+)(.*)$").expect("未能编译 LRC_LINE_REGEX")
});

/// 用于从一个时间戳组中提取出单个时间戳
static LRC_TIMESTAMP_EXTRACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2,}):(\d{2})[.:](\d{2,3})]").expect("未能编译 LRC_TIMESTAMP_EXTRACT_REGEX")
});

/// 用于匹配 `[ar:艺术家]` 这样的标签
static LRC_METADATA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([a-zA-Z#]+):(.*)]$").expect("未能编译 LRC_METADATA_REGEX")
});

struct TempLrcEntry {
    time: f64,
    text: String,
}

/// 解析 LRC 格式内容到 `ParsedLyrics` 结构。
///
/// 无法识别的行会被静默丢弃，因此该函数不会失败。
#[must_use]
pub fn parse_lrc(content: &str) -> ParsedLyrics {
    let mut entries: Vec<TempLrcEntry> = Vec::new();
    let mut metadata: BTreeMap<String, String> = BTreeMap::new();
    let mut warnings: Vec<String> = Vec::new();

    for (line_num, line_str) in content.lines().enumerate() {
        let line_str_trimmed = line_str.trim().trim_start_matches('\u{feff}');
        if line_str_trimmed.is_empty() {
            continue;
        }

        if let Some(line_caps) = LRC_LINE_REGEX.captures(line_str_trimmed) {
            let all_timestamps_str = line_caps.get(1).map_or("", |m| m.as_str());
            let text_part = normalize_text_whitespace(line_caps.get(2).map_or("", |m| m.as_str()));
            if text_part.is_empty() {
                continue;
            }

            for ts_cap in LRC_TIMESTAMP_EXTRACT_REGEX.captures_iter(all_timestamps_str) {
                let Some(time) = timestamp_from_captures(&ts_cap) else {
                    warnings.push(format!(
                        "LRC 时间戳无效 (行 {}): '{}'",
                        line_num + 1,
                        &ts_cap[0]
                    ));
                    continue;
                };
                entries.push(TempLrcEntry {
                    time,
                    text: text_part.clone(),
                });
            }
        } else if let Some(meta_caps) = LRC_METADATA_REGEX.captures(line_str_trimmed) {
            let key = meta_caps[1].trim().to_ascii_lowercase();
            let value = meta_caps[2].trim().to_string();
            if !value.is_empty() {
                metadata.entry(key).or_insert(value);
            }
        }
    }

    let offset = metadata
        .get("offset")
        .and_then(|raw| match raw.trim_start_matches('+').parse::<i64>() {
            Ok(ms) => Some(ms),
            Err(e) => {
                warn!("忽略无效的 LRC offset 标签 '{raw}': {e}");
                None
            }
        })
        .unwrap_or(0);

    // offset 为正表示歌词提前显示
    let shift = offset as f64 / 1000.0;
    let lines: Vec<LyricsLine> = entries
        .into_iter()
        .map(|e| LyricsLine::new((e.time - shift).max(0.0), e.text))
        .collect();

    debug!("LRC 解析完成: {} 行, {} 个标签", lines.len(), metadata.len());

    let mut parsed = ParsedLyrics {
        synced: !lines.is_empty(),
        lines,
        format: LyricsFormat::Lrc,
        metadata,
        warnings,
        ..Default::default()
    };
    parsed.sort_lines();
    parsed
}

/// 从时间戳捕获组计算秒数。秒数不小于 60 时视为无效。
fn timestamp_from_captures(ts_cap: &regex::Captures<'_>) -> Option<f64> {
    let minutes: u64 = ts_cap[1].parse().ok()?;
    let seconds: u64 = ts_cap[2].parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    let fraction_str = &ts_cap[3];
    let fraction: u64 = fraction_str.parse().ok()?;
    // 两位是百分秒，三位是毫秒
    let fraction = match fraction_str.len() {
        2 => fraction as f64 / 100.0,
        _ => fraction as f64 / 1000.0,
    };
    Some((minutes * 60 + seconds) as f64 + fraction)
}
