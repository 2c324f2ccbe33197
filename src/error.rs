use std::io;

use quick_xml::{
    Error as QuickXmlErrorMain, encoding::EncodingError,
    events::attributes::AttrError as QuickXmlAttrError,
};
use thiserror::Error;

/// 定义歌词解析与同步过程中可能发生的各种错误。
///
/// 解析器对外保持“尽力而为”：这些错误只在内部传播，
/// 最终会被降级为被跳过的行或一条警告。
#[derive(Error, Debug)]
pub enum LyricsError {
    /// XML 读取错误，通常来自 `quick-xml` 库。
    #[error("XML 解析错误: {0}")]
    Xml(#[from] QuickXmlErrorMain),
    /// XML 属性解析错误，通常来自 `quick-xml` 库。
    #[error("XML 属性错误: {0}")]
    Attribute(#[from] QuickXmlAttrError),
    /// XML 文本编码或解码错误。
    #[error("文本编码或解码错误: {0}")]
    Encoding(#[from] EncodingError),
    /// 整数解析错误。
    #[error("解析错误: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    /// 无效的时间格式字符串。
    #[error("无效的时间格式: {0}")]
    InvalidTime(String),
    /// 配置文件内容无效。
    #[error("配置解析失败: {0}")]
    Config(#[from] toml::de::Error),
    /// JSON 序列化错误。
    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 文件读写等IO错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 内部逻辑错误或未明确分类的错误。
    #[error("错误: {0}")]
    Internal(String),
}

impl From<LyricsError> for io::Error {
    fn from(err: LyricsError) -> Self {
        Self::other(err)
    }
}
