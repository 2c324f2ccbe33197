//! 间奏（两行之间的长时间空白）检测。

use crate::config::SyncConfig;
use crate::types::LyricsLine;

/// 间奏检测结果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(super) struct GapStatus {
    pub(super) in_gap: bool,
    pub(super) progress: f64,
    pub(super) time_remaining: f64,
}

/// 判断 `current_time` 是否处在 `line` 与 `next` 之间的间奏中。
///
/// 只有间隔不小于 `pause_threshold` 且当前行有明确结束时间时才可能进入间奏。
/// 最后 `final_inhale_duration` 秒不计入进度。
pub(super) fn detect_gap(
    line: &LyricsLine,
    next: &LyricsLine,
    current_time: f64,
    config: &SyncConfig,
) -> GapStatus {
    let gap = next.time - line.time;
    let Some(end_time) = line.end_time else {
        return GapStatus::default();
    };
    if gap < config.pause_threshold {
        return GapStatus::default();
    }

    let line_end_offset = end_time - line.time;
    let time_into_gap = current_time - line.time;
    let time_remaining = next.time - current_time;

    if time_into_gap <= line_end_offset || time_remaining < config.min_dots_duration {
        return GapStatus::default();
    }

    let denominator = gap - line_end_offset - config.final_inhale_duration;
    let progress = if denominator > 0.0 {
        ((time_into_gap - line_end_offset) / denominator).clamp(0.0, 1.0)
    } else {
        1.0
    };

    GapStatus {
        in_gap: true,
        progress,
        time_remaining,
    }
}
