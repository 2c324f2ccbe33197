//! # 翻译合并
//!
//! 按数组下标把次要文档的翻译、音译并入主文档。主文档已有的内容总是优先。
//! 行数或词数不一致时只合并重叠部分，并记录一条警告。

use tracing::{debug, trace, warn};

use crate::types::{LyricsLine, ParsedLyrics};

/// 将 `secondary` 中的翻译与音译合并到 `primary` 的副本中。
///
/// - 行按下标一一对应，主文档缺少翻译的行使用次要文档对应行的翻译；
/// - 对应行中的词也按下标对应，主文档缺少音译的词使用次要文档的音译；
/// - `has_translation` / `has_transliteration` 取并集，语言只在主文档缺失时补充。
#[must_use]
pub fn merge_translations(primary: &ParsedLyrics, secondary: &ParsedLyrics) -> ParsedLyrics {
    let mut merged = primary.clone();
    if primary.lines.is_empty() || secondary.lines.is_empty() {
        trace!("主文档或次要文档为空，跳过合并");
        return merged;
    }
    check_alignment(&mut merged, secondary.lines.len(), "翻译合并");

    for (line_idx, (line, other)) in merged
        .lines
        .iter_mut()
        .zip(&secondary.lines)
        .enumerate()
    {
        if line.translation.is_none() {
            line.translation.clone_from(&other.translation);
        }
        merge_word_transliterations(line, other, line_idx, &mut merged.warnings);
    }

    merged.has_translation |= secondary.has_translation;
    merged.has_transliteration |= secondary.has_transliteration;
    if merged.translation_language.is_none() {
        merged
            .translation_language
            .clone_from(&secondary.translation_language);
    }
    if merged.transliteration_language.is_none() {
        merged
            .transliteration_language
            .clone_from(&secondary.transliteration_language);
    }

    debug!("翻译合并完成，共 {} 行", merged.lines.len());
    merged
}

/// 依次合并多个次要文档，先出现的文档优先。
#[must_use]
pub fn merge_all<'a, I>(primary: &ParsedLyrics, secondaries: I) -> ParsedLyrics
where
    I: IntoIterator<Item = &'a ParsedLyrics>,
{
    secondaries
        .into_iter()
        .fold(primary.clone(), |acc, secondary| {
            merge_translations(&acc, secondary)
        })
}

/// 把次要文档每一行的*文本*作为主文档同一下标行的翻译。
///
/// 适用于 `song.zh.lrc` 这类只包含译文的伴随文件。
#[must_use]
pub fn merge_text_as_translation(
    primary: &ParsedLyrics,
    secondary: &ParsedLyrics,
    language: Option<&str>,
) -> ParsedLyrics {
    let mut merged = primary.clone();
    if primary.lines.is_empty() || secondary.lines.is_empty() {
        trace!("主文档或次要文档为空，跳过逐行合并");
        return merged;
    }
    check_alignment(&mut merged, secondary.lines.len(), "逐行合并");

    let mut attached = false;
    for (line, other) in merged.lines.iter_mut().zip(&secondary.lines) {
        let text = other.text.trim();
        if line.translation.is_none() && !text.is_empty() {
            line.translation = Some(text.to_string());
            attached = true;
        }
    }

    if attached {
        merged.has_translation = true;
        if merged.translation_language.is_none() {
            merged.translation_language = language.map(str::to_string);
        }
    }
    merged
}

fn check_alignment(merged: &mut ParsedLyrics, secondary_len: usize, context: &str) {
    let primary_len = merged.lines.len();
    if primary_len != secondary_len {
        warn!("{context}: 主歌词有 {primary_len} 行，次要歌词有 {secondary_len} 行，只合并重叠部分");
        merged.warnings.push(format!(
            "{context}: 行数不一致 ({primary_len} / {secondary_len})，只合并了前 {} 行。",
            primary_len.min(secondary_len)
        ));
    }
}

fn merge_word_transliterations(
    line: &mut LyricsLine,
    other: &LyricsLine,
    line_idx: usize,
    warnings: &mut Vec<String>,
) {
    let (Some(words), Some(other_words)) = (line.words.as_mut(), other.words.as_ref()) else {
        return;
    };
    if words.len() != other_words.len() {
        warn!(
            "第 {} 行词数不一致 ({} / {})，只合并重叠部分的音译",
            line_idx + 1,
            words.len(),
            other_words.len()
        );
        warnings.push(format!(
            "第 {} 行词数不一致 ({} / {})。",
            line_idx + 1,
            words.len(),
            other_words.len()
        ));
    }
    for (word, other_word) in words.iter_mut().zip(other_words) {
        if word.transliteration.is_none() {
            word.transliteration.clone_from(&other_word.transliteration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LyricsFormat, LyricsWord};

    fn doc(lines: Vec<LyricsLine>) -> ParsedLyrics {
        ParsedLyrics {
            synced: true,
            lines,
            format: LyricsFormat::Ttml,
            ..Default::default()
        }
    }

    fn word(time: f64, text: &str, transliteration: Option<&str>) -> LyricsWord {
        LyricsWord {
            time,
            end_time: None,
            text: text.to_string(),
            syllables: None,
            transliteration: transliteration.map(str::to_string),
        }
    }

    fn translated(time: f64, text: &str, translation: Option<&str>) -> LyricsLine {
        LyricsLine {
            translation: translation.map(str::to_string),
            ..LyricsLine::new(time, text)
        }
    }

    #[test]
    fn test_primary_translation_wins() {
        let primary = doc(vec![
            translated(1.0, "a", Some("keep")),
            translated(2.0, "b", None),
        ]);
        let mut secondary = doc(vec![
            translated(1.0, "a", Some("replace")),
            translated(2.0, "b", Some("fill")),
        ]);
        secondary.has_translation = true;
        secondary.translation_language = Some("en".to_string());

        let merged = merge_translations(&primary, &secondary);
        assert_eq!(merged.lines[0].translation.as_deref(), Some("keep"));
        assert_eq!(merged.lines[1].translation.as_deref(), Some("fill"));
        assert!(merged.has_translation);
        assert_eq!(merged.translation_language.as_deref(), Some("en"));
        assert!(merged.warnings.is_empty());
        assert_eq!(primary.lines[1].translation, None);
    }

    #[test]
    fn test_transliterations_merged_per_word() {
        let mut line = LyricsLine::new(1.0, "a b");
        line.words = Some(vec![word(1.0, "a", Some("own")), word(1.5, "b", None)]);
        let primary = doc(vec![line]);

        let mut other = LyricsLine::new(1.0, "a b");
        other.words = Some(vec![word(1.0, "a", Some("x")), word(1.5, "b", Some("y"))]);
        let mut secondary = doc(vec![other]);
        secondary.has_transliteration = true;

        let merged = merge_translations(&primary, &secondary);
        let words = merged.lines[0].words.as_deref().unwrap_or_default();
        assert_eq!(words[0].transliteration.as_deref(), Some("own"));
        assert_eq!(words[1].transliteration.as_deref(), Some("y"));
        assert!(merged.has_transliteration);
    }

    #[test]
    fn test_misaligned_merge_uses_overlap() {
        let primary = doc(vec![
            translated(1.0, "a", None),
            translated(2.0, "b", None),
            translated(3.0, "c", None),
        ]);
        let secondary = doc(vec![translated(1.0, "a", Some("A"))]);

        let merged = merge_translations(&primary, &secondary);
        assert_eq!(merged.lines.len(), 3);
        assert_eq!(merged.lines[0].translation.as_deref(), Some("A"));
        assert_eq!(merged.lines[2].translation, None);
        assert_eq!(merged.warnings.len(), 1);
    }

    #[test]
    fn test_merge_all_first_secondary_wins() {
        let primary = doc(vec![translated(1.0, "a", None)]);
        let first = doc(vec![translated(1.0, "a", Some("first"))]);
        let second = doc(vec![translated(1.0, "a", Some("second"))]);

        let merged = merge_all(&primary, [&first, &second]);
        assert_eq!(merged.lines[0].translation.as_deref(), Some("first"));
    }

    #[test]
    fn test_merge_text_as_translation() {
        let primary = doc(vec![translated(1.0, "hello", None), translated(2.0, "world", None)]);
        let secondary = doc(vec![LyricsLine::new(1.0, "你好"), LyricsLine::new(2.0, "世界")]);

        let merged = merge_text_as_translation(&primary, &secondary, Some("zh"));
        assert_eq!(merged.lines[0].translation.as_deref(), Some("你好"));
        assert_eq!(merged.lines[1].translation.as_deref(), Some("世界"));
        assert!(merged.has_translation);
        assert_eq!(merged.translation_language.as_deref(), Some("zh"));
    }

    #[test]
    fn test_merge_with_empty_secondary_is_identity() {
        let primary = doc(vec![translated(1.0, "a", None)]);
        let merged = merge_translations(&primary, &ParsedLyrics::default());
        assert_eq!(merged, primary);
    }
}
