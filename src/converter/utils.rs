//! # 解析器共用的工具函数
//!
//! 时间戳解析与文本清理。

use crate::error::LyricsError;

/// 解析时间字符串到秒。
///
/// 依次尝试以下格式：
/// 1. 纯秒数，可带 `s` 后缀，例如 `"12.5"`、`"12.5s"`。
/// 2. `[HH:]MM:SS[.fraction]`。
///
/// 格式不合法时返回 [`LyricsError::InvalidTime`]，调用方应跳过对应的行或音节。
pub fn parse_timestamp(time_str: &str) -> Result<f64, LyricsError> {
    // 解析 "SS.fff" 或 "SS"，返回秒和小数部分
    fn parse_seconds_and_fraction(
        part: &str,
        original_time_str: &str,
    ) -> Result<(u64, f64), LyricsError> {
        let mut dot_parts = part.splitn(2, '.');
        let seconds_str = dot_parts.next().unwrap_or_default();

        if seconds_str.is_empty() || !seconds_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(LyricsError::InvalidTime(format!(
                "时间戳 '{original_time_str}' 的秒部分 '{seconds_str}' 无效"
            )));
        }
        let seconds = seconds_str.parse::<u64>()?;

        let fraction = match dot_parts.next() {
            Some(fraction_str) => {
                if fraction_str.is_empty() || !fraction_str.chars().all(|c| c.is_ascii_digit()) {
                    return Err(LyricsError::InvalidTime(format!(
                        "时间戳 '{original_time_str}' 的小数部分 '{fraction_str}' 无效"
                    )));
                }
                format!("0.{fraction_str}").parse::<f64>().map_err(|e| {
                    LyricsError::InvalidTime(format!(
                        "无法解析时间戳 '{original_time_str}' 的小数部分: {e}"
                    ))
                })?
            }
            None => 0.0,
        };

        Ok((seconds, fraction))
    }

    let time_str = time_str.trim();
    if time_str.is_empty() {
        return Err(LyricsError::InvalidTime("时间戳为空".to_string()));
    }
    if time_str.starts_with('-') {
        return Err(LyricsError::InvalidTime(format!(
            "时间戳不能为负: '{time_str}'"
        )));
    }

    // 格式："12.345s"
    if let Some(stripped) = time_str.strip_suffix('s') {
        let (seconds, fraction) = parse_seconds_and_fraction(stripped, time_str)?;
        return Ok(seconds as f64 + fraction);
    }

    // 格式："HH:MM:SS.fff", "MM:SS.fff", "SS.fff"
    // 从后往前解析
    let mut parts_iter = time_str.split(':').rev();
    let last_part = parts_iter.next().unwrap_or_default();
    let (seconds, fraction) = parse_seconds_and_fraction(last_part, time_str)?;

    let mut total = seconds as f64 + fraction;
    let has_colon = time_str.contains(':');

    if has_colon && seconds >= 60 {
        return Err(LyricsError::InvalidTime(format!(
            "秒值 '{seconds}' (应 < 60) 在时间戳 '{time_str}' 中无效"
        )));
    }

    if let Some(minutes_str) = parts_iter.next() {
        let minutes = parse_integer_part(minutes_str, time_str)?;
        if minutes >= 60 && parts_iter.clone().next().is_some() {
            return Err(LyricsError::InvalidTime(format!(
                "分钟值 '{minutes}' (应 < 60) 在时间戳 '{time_str}' 中无效"
            )));
        }
        total += minutes as f64 * 60.0;
    }

    if let Some(hours_str) = parts_iter.next() {
        let hours = parse_integer_part(hours_str, time_str)?;
        total += hours as f64 * 3600.0;
    }

    if parts_iter.next().is_some() {
        return Err(LyricsError::InvalidTime(format!(
            "时间格式 '{time_str}' 包含过多部分"
        )));
    }

    Ok(total)
}

fn parse_integer_part(part: &str, original_time_str: &str) -> Result<u64, LyricsError> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(LyricsError::InvalidTime(format!(
            "时间戳 '{original_time_str}' 中的 '{part}' 不是有效的整数"
        )));
    }
    Ok(part.parse::<u64>()?)
}

/// 将秒数格式化为 LRC 时间标签，例如 `[01:02.35]`。
#[must_use]
pub fn format_lrc_timestamp(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let minutes = total_cs / 6000;
    let secs = (total_cs % 6000) / 100;
    let centis = total_cs % 100;
    format!("[{minutes:02}:{secs:02}.{centis:02}]")
}

/// 规范化文本中的空白字符，连续空白折叠为单个空格。
#[must_use]
pub fn normalize_text_whitespace(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    normalize_text_whitespace_into(text, &mut output);
    output
}

/// 规范化文本中的空白字符，结果写入 `output`。
pub(crate) fn normalize_text_whitespace_into(input: &str, output: &mut String) {
    output.clear();
    let mut first = true;
    for word in input.split_whitespace() {
        if !first {
            output.push(' ');
        }
        output.push_str(word);
        first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_time(input: &str, expected: f64) {
        let parsed = parse_timestamp(input).unwrap();
        assert!(
            (parsed - expected).abs() < 1e-9,
            "'{input}' 解析为 {parsed}，期望 {expected}"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_time("12.5", 12.5);
        assert_time("12.5s", 12.5);
        assert_time("15s", 15.0);
        assert_time("7", 7.0);
        assert_time("0.0s", 0.0);
        assert_time("123.456", 123.456);
        assert_time("99999.123s", 99_999.123);
        assert_time("05:10.1", 310.1);
        assert_time("05:10.12", 310.12);
        assert_time("01:02:03.456", 3723.456);
        assert_time("00:00:00.000", 0.0);
        assert_time("99:59:59.999", 359_999.999);
        assert_time("75:00.000", 4500.0);
        assert_time(" 1.25 ", 1.25);
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in [
            "", "abc", "s", "-10s", "-01:00:00.000", "10.s", ".5s", "10.abc", "1:2:3:4",
            "01:60:00.000", "01:00:60.000", "01:00:.000", "1e3",
        ] {
            assert!(
                matches!(parse_timestamp(bad), Err(LyricsError::InvalidTime(_))),
                "'{bad}' 应当解析失败"
            );
        }
    }

    #[test]
    fn test_lrc_timestamp_round_trip() {
        for m in [0_u32, 1, 9, 59, 99] {
            for s in [0_u32, 1, 30, 59] {
                for c in [0_u32, 1, 50, 99] {
                    let seconds = f64::from(m) * 60.0 + f64::from(s) + f64::from(c) / 100.0;
                    let tag = format_lrc_timestamp(seconds);
                    let inner = tag.trim_start_matches('[').trim_end_matches(']');
                    let parsed = parse_timestamp(inner).unwrap();
                    assert!((parsed - seconds).abs() < 0.01, "{tag} -> {parsed}");
                }
            }
        }
    }

    #[test]
    fn test_normalize_text_whitespace() {
        assert_eq!(normalize_text_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_text_whitespace("\n\t  foo \r\n bar\t"), "foo bar");
        assert_eq!(normalize_text_whitespace("   "), "");
    }
}
