//! 负责同步引擎与解析器的可调参数。
//!
//! 所有字段都有默认值，配置文件只需写出想要覆盖的项：
//!
//! ```toml
//! [sync]
//! pause_threshold = 5.0
//!
//! [parsing]
//! transliteration_tolerance = 0.05
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LyricsError;

/// 同步引擎的阈值，单位均为秒。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 两行之间的间隔达到该值才可能显示间奏指示
    pub pause_threshold: f64,
    /// 距下一行开始的剩余时间不足该值时不再显示间奏指示
    pub min_dots_duration: f64,
    /// 间奏最后这段时间留给“吸气”动画，不计入主进度
    pub final_inhale_duration: f64,
    /// 向后跳转超过该值才视为真正的回退
    pub seek_tolerance: f64,
    /// 没有结束时间的词默认持续的时长
    pub default_word_duration: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pause_threshold: 4.0,
            min_dots_duration: 1.5,
            final_inhale_duration: 1.0,
            seek_tolerance: 2.0,
            default_word_duration: 0.3,
        }
    }
}

/// 解析选项。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingOptions {
    /// 音译 span 与词的开始时间之差在该范围内才会匹配
    pub transliteration_tolerance: f64,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            transliteration_tolerance: 0.1,
        }
    }
}

/// 顶层配置。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub sync: SyncConfig,
    pub parsing: ParsingOptions,
}

impl LyricsConfig {
    /// 从 TOML 字符串解析配置。
    pub fn from_toml_str(content: &str) -> Result<Self, LyricsError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载配置。文件不存在时返回默认配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LyricsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!("已加载歌词配置: {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("未找到配置文件 {}，使用默认配置。", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
