//! 逐字高亮进度。

use crate::types::{LyricsSyllable, LyricsWord};

/// `[time, time + duration)` 区间内的线性进度，结果限制在 `[0, 1]`。
///
/// 时长不大于 0 时，开始后即视为完成。
pub(super) fn ratio(current_time: f64, time: f64, end_time: Option<f64>, default_duration: f64) -> f64 {
    if current_time < time {
        return 0.0;
    }
    let duration = end_time.map_or(default_duration, |end| end - time);
    if duration <= 0.0 {
        return 1.0;
    }
    ((current_time - time) / duration).clamp(0.0, 1.0)
}

/// 计算一个词在 `current_time` 时的高亮进度。
#[must_use]
pub fn word_progress(word: &LyricsWord, current_time: f64, default_duration: f64) -> f64 {
    ratio(current_time, word.time, word.end_time, default_duration)
}

/// 计算一个词中每个音节的高亮进度。
///
/// 单音节词（`syllables` 为 `None`）返回只含整个词进度的数组。
#[must_use]
pub fn syllable_progress(word: &LyricsWord, current_time: f64, default_duration: f64) -> Vec<f64> {
    word.syllables.as_ref().map_or_else(
        || vec![word_progress(word, current_time, default_duration)],
        |syllables| {
            syllables
                .iter()
                .map(|s: &LyricsSyllable| ratio(current_time, s.time, s.end_time, default_duration))
                .collect()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(time: f64, end_time: Option<f64>) -> LyricsWord {
        LyricsWord {
            time,
            end_time,
            text: "w".to_string(),
            syllables: None,
            transliteration: None,
        }
    }

    #[test]
    fn test_word_progress_with_end_time() {
        let w = word(1.0, Some(2.0));
        assert!((word_progress(&w, 0.5, 0.3) - 0.0).abs() < 1e-9);
        assert!((word_progress(&w, 1.5, 0.3) - 0.5).abs() < 1e-9);
        assert!((word_progress(&w, 3.0, 0.3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_word_progress_default_duration() {
        let w = word(1.0, None);
        assert!((word_progress(&w, 1.15, 0.3) - 0.5).abs() < 1e-9);
        assert!((word_progress(&w, 1.3, 0.3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_word_is_complete_once_started() {
        let w = word(1.0, Some(1.0));
        assert!((word_progress(&w, 0.9, 0.3) - 0.0).abs() < 1e-9);
        assert!((word_progress(&w, 1.0, 0.3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_syllable_progress() {
        let mut w = word(1.0, Some(2.0));
        w.syllables = Some(vec![
            LyricsSyllable {
                time: 1.0,
                end_time: Some(1.5),
                text: "a".to_string(),
            },
            LyricsSyllable {
                time: 1.5,
                end_time: Some(2.0),
                text: "b".to_string(),
            },
        ]);
        let progress = syllable_progress(&w, 1.75, 0.3);
        assert_eq!(progress.len(), 2);
        assert!((progress[0] - 1.0).abs() < 1e-9);
        assert!((progress[1] - 0.5).abs() < 1e-9);

        let single = syllable_progress(&word(1.0, Some(2.0)), 1.5, 0.3);
        assert_eq!(single.len(), 1);
    }
}
