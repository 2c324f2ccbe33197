//! # 统一歌词数据模型
//!
//! 所有解析器都产出 [`ParsedLyrics`]，同步引擎也只依赖这一结构。
//! 时间统一使用秒（`f64`）。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

use crate::error::LyricsError;

/// 枚举：表示支持的歌词格式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LyricsFormat {
    /// 标准 LRC 格式，仅有逐行时间。
    Lrc,
    /// `SubRip` 字幕格式，带开始与结束时间。
    Srt,
    /// `Timed Text Markup Language` 格式，可带逐字时间。
    Ttml,
    /// 无时间信息的纯文本。
    #[default]
    Plain,
}

impl LyricsFormat {
    /// 将歌词格式枚举转换为对应的文件扩展名字符串。
    #[must_use]
    pub const fn to_extension_str(self) -> &'static str {
        match self {
            Self::Lrc => "lrc",
            Self::Srt => "srt",
            Self::Ttml => "ttml",
            Self::Plain => "txt",
        }
    }

    /// 从文件扩展名解析歌词格式。不区分大小写，会忽略前导的点。
    ///
    /// 无法识别的扩展名返回 `None`，由调用方决定是否继续嗅探内容。
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "lrc" => Some(Self::Lrc),
            "srt" => Some(Self::Srt),
            "ttml" | "xml" => Some(Self::Ttml),
            "txt" => Some(Self::Plain),
            _ => None,
        }
    }
}

impl fmt::Display for LyricsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lrc => write!(f, "LRC"),
            Self::Srt => write!(f, "SRT"),
            Self::Ttml => write!(f, "TTML"),
            Self::Plain => write!(f, "纯文本"),
        }
    }
}

/// 一个带时间的音节。
///
/// 只有当一个词由两个及以上相邻的计时 span 组成时才会出现（例如 CJK 音节）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsSyllable {
    /// 开始时间（秒）
    pub time: f64,
    /// 结束时间（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    /// 音节文本
    pub text: String,
}

/// 一个可演唱的词。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsWord {
    /// 开始时间（秒），即第一个音节的开始时间
    pub time: f64,
    /// 结束时间（秒），即最后一个音节的结束时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    /// 完整的词文本，总是所有音节文本的拼接
    pub text: String,
    /// 组成该词的音节，仅在音节数不少于 2 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllables: Option<Vec<LyricsSyllable>>,
    /// 该词的音译（罗马音等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

impl LyricsWord {
    /// 该词是否由多个音节拼接而成。
    #[must_use]
    pub fn is_syllabified(&self) -> bool {
        self.syllables.as_ref().is_some_and(|s| s.len() > 1)
    }
}

/// 歌词行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsLine {
    /// 行的开始时间（秒）。纯文本歌词中为行号。
    pub time: f64,
    /// 行的结束时间（秒），只有 SRT 与 TTML 会提供
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    /// 行文本，空白已折叠为单个空格
    pub text: String,
    /// 逐字时间，仅支持逐字计时的格式会提供
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<LyricsWord>>,
    /// 演唱者标识，例如 "v1"、"v2"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// 该行的翻译
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl LyricsLine {
    /// 创建一个只有时间和文本的行。
    #[must_use]
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            end_time: None,
            text: text.into(),
            words: None,
            agent: None,
            translation: None,
        }
    }

    /// 该行是否带有逐字时间。
    #[must_use]
    pub fn has_words(&self) -> bool {
        self.words.as_ref().is_some_and(|w| !w.is_empty())
    }
}

/// 统一的歌词文档。
///
/// 由解析器一次性生成，之后不可变；合并翻译会产生新的文档。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedLyrics {
    /// 是否为带时间的歌词
    pub synced: bool,
    /// 按时间升序排列的歌词行
    pub lines: Vec<LyricsLine>,
    /// 源格式
    pub format: LyricsFormat,
    /// 是否至少有一行带逐字时间
    #[serde(default)]
    pub has_word_timing: bool,
    /// 是否带有翻译
    #[serde(default)]
    pub has_translation: bool,
    /// 是否带有音译
    #[serde(default)]
    pub has_transliteration: bool,
    /// 翻译语言
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_language: Option<String>,
    /// 音译语言
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration_language: Option<String>,
    /// 词曲作者
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songwriters: Option<Vec<String>>,
    /// 源文件中的其它元数据，例如 LRC 的 `[ti:]`、`[ar:]` 标签
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// 解析过程中产生的非致命警告
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ParsedLyrics {
    /// 创建一个指定格式的空文档。
    #[must_use]
    pub fn empty(format: LyricsFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// 文档中是否没有任何歌词行。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 按时间对歌词行进行稳定排序。
    pub(crate) fn sort_lines(&mut self) {
        self.lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// 将文档序列化为 JSON，供界面层使用。
    pub fn to_json(&self) -> Result<String, LyricsError> {
        Ok(serde_json::to_string(self)?)
    }
}
