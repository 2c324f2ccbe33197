//! 各种歌词格式的解析器。

pub mod lrc_parser;
pub mod plain_parser;
pub mod srt_parser;
pub mod ttml_parser;

pub use lrc_parser::parse_lrc;
pub use plain_parser::parse_plain;
pub use srt_parser::parse_srt;
pub use ttml_parser::parse_ttml;
