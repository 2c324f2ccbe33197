//! # TTML 解析器 - 常量定义
//!
//! 标签名按本地名（去掉命名空间前缀）比较，属性名保留前缀。

pub(super) const TAG_TT: &[u8] = b"tt";
pub(super) const TAG_METADATA: &[u8] = b"metadata";
pub(super) const TAG_BODY: &[u8] = b"body";
pub(super) const TAG_P: &[u8] = b"p";
pub(super) const TAG_SPAN: &[u8] = b"span";
pub(super) const TAG_BR: &[u8] = b"br";

pub(super) const TAG_META: &[u8] = b"meta";
pub(super) const TAG_ITUNES_METADATA: &[u8] = b"iTunesMetadata";
pub(super) const TAG_SONGWRITER: &[u8] = b"songwriter";
pub(super) const TAG_TRANSLATIONS: &[u8] = b"translations";
pub(super) const TAG_TRANSLITERATIONS: &[u8] = b"transliterations";
pub(super) const TAG_TRANSLATION: &[u8] = b"translation";
pub(super) const TAG_TRANSLITERATION: &[u8] = b"transliteration";
pub(super) const TAG_TEXT: &[u8] = b"text";

pub(super) const ATTR_ITUNES_TIMING: &[u8] = b"itunes:timing";
pub(super) const ATTR_XML_LANG: &[u8] = b"xml:lang";
pub(super) const ATTR_BEGIN: &[u8] = b"begin";
pub(super) const ATTR_END: &[u8] = b"end";
pub(super) const ATTR_AGENT: &[u8] = b"ttm:agent";
pub(super) const ATTR_AGENT_ALIAS: &[u8] = b"agent";
pub(super) const ATTR_ROLE: &[u8] = b"ttm:role";
pub(super) const ATTR_ROLE_ALIAS: &[u8] = b"role";
pub(super) const ATTR_KEY: &[u8] = b"key";
pub(super) const ATTR_VALUE: &[u8] = b"value";
pub(super) const ATTR_FOR: &[u8] = b"for";

pub(super) const ROLE_TRANSLATION: &[u8] = b"x-translation";
pub(super) const ROLE_ROMANIZATION: &[u8] = b"x-roman";
pub(super) const ROLE_BACKGROUND: &[u8] = b"x-bg";

pub(super) const TIMING_WORD: &str = "word";
