//! # 解析器的状态机和数据结构

use std::collections::BTreeMap;

use crate::types::{LyricsLine, LyricsSyllable, LyricsWord};

/// 主解析器状态机，聚合了所有子状态。
#[derive(Debug, Default)]
pub(super) struct TtmlParserState {
    /// 是否按逐字计时解析。由 `<tt itunes:timing>` 或自动检测确定。
    pub(super) word_timing_declared: bool,
    pub(super) in_metadata: bool,
    /// 存储 `<metadata>` 区域解析状态的结构体。
    pub(super) metadata_state: MetadataParseState,
    /// 存储 `<body>` 和 `<p>` 区域解析状态的结构体。
    pub(super) body_state: BodyParseState,
    /// 不在任何 `<p>` 中的顶层计时 span，仅在没有任何 `<p>` 时使用。
    pub(super) loose_lines: Vec<LyricsLine>,
    pub(super) metadata: BTreeMap<String, String>,
    /// 第一个带 `xml:lang` 的行内翻译 span 的语言
    pub(super) inline_translation_language: Option<String>,
    pub(super) warnings: Vec<String>,
}

/// 辅助轨道的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AuxTrackType {
    Translation,
    Transliteration,
}

#[derive(Debug, Default)]
pub(super) enum MetadataContext {
    #[default]
    None,
    InITunesMetadata,
    InSongwriter,
    /// 代表 `<translations>` 或 `<transliterations>`
    InAuxiliaryContainer { aux_type: AuxTrackType },
    /// 代表 `<translation>` 或 `<transliteration>`
    InAuxiliaryEntry {
        aux_type: AuxTrackType,
        lang: Option<String>,
    },
    /// 代表 `<text for="L1">`
    InAuxiliaryText {
        aux_type: AuxTrackType,
        lang: Option<String>,
        key: Option<String>,
    },
}

/// `<iTunesMetadata>` 中的一条 `<text>`
#[derive(Debug, Clone)]
pub(super) struct AuxiliaryEntry {
    pub(super) key: String,
    pub(super) lang: Option<String>,
    /// 全部文本内容
    pub(super) text: String,
    /// 带时间的 span：(开始时间, 文本)
    pub(super) timed_spans: Vec<(f64, String)>,
}

/// 存储 `<metadata>` 区域解析状态的结构体。
#[derive(Debug, Default)]
pub(super) struct MetadataParseState {
    pub(super) context: MetadataContext,
    pub(super) translations: Vec<AuxiliaryEntry>,
    pub(super) transliterations: Vec<AuxiliaryEntry>,
    pub(super) songwriters: Vec<String>,

    pub(super) current_text: String,
    pub(super) current_timed_spans: Vec<(f64, String)>,
    pub(super) span_stack: Vec<SpanContext>,
    pub(super) text_buffer: String,
}

/// 存储 `<body>` 和 `<p>` 区域解析状态的结构体。
#[derive(Debug, Default)]
pub(super) struct BodyParseState {
    pub(super) in_body: bool,
    pub(super) in_p: bool,
    /// 存储当前正在处理的 `<p>` 元素的临时数据。
    pub(super) current_p_element_data: Option<CurrentPElementData>,
    /// `<span>` 标签的上下文堆栈，用于处理嵌套的 span。
    pub(super) span_stack: Vec<SpanContext>,
    /// `<p>` 之外的计时 span（回退路径）
    pub(super) loose_line: Option<LooseLine>,
}

/// 存储当前处理的 `<p>` 元素解析过程中的临时数据。
#[derive(Debug, Default)]
pub(super) struct CurrentPElementData {
    pub(super) begin: Option<f64>,
    pub(super) end: Option<f64>,
    pub(super) agent: Option<String>,
    /// 行文本（不含翻译和罗马音 span）
    pub(super) line_text_accumulator: String,
    pub(super) inline_translation: Option<String>,
    pub(super) words: WordAssembler,
}

/// 代表当前 `<span>` 的上下文信息。
#[derive(Debug, Clone)]
pub(super) struct SpanContext {
    pub(super) role: SpanRole,
    pub(super) begin: Option<f64>,
    pub(super) end: Option<f64>,
    pub(super) lang: Option<String>,
    /// 是否包含子 span。容器 span 本身不产生音节。
    pub(super) has_children: bool,
    pub(super) text: String,
}

/// 定义 `<span>` 标签可能扮演的角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SpanRole {
    /// 普通音节
    Generic,
    /// 翻译
    Translation,
    /// 罗马音
    Romanization,
    /// 背景人声容器
    Background,
}

impl SpanRole {
    /// 翻译与罗马音的文本不属于歌词行本身。
    pub(super) const fn is_auxiliary(self) -> bool {
        matches!(self, Self::Translation | Self::Romanization)
    }
}

/// 顶层计时 span 构成的行
#[derive(Debug)]
pub(super) struct LooseLine {
    pub(super) begin: f64,
    pub(super) end: Option<f64>,
    pub(super) text: String,
    pub(super) depth: usize,
}

/// 将相邻的计时 span 组装成词。
///
/// 两个音节之间只要出现空白或其它文本，就开始一个新词。
#[derive(Debug, Default)]
pub(super) struct WordAssembler {
    words: Vec<LyricsWord>,
    current: Vec<LyricsSyllable>,
    boundary_pending: bool,
}

impl WordAssembler {
    /// 添加一个音节。`leading_space` / `trailing_space` 表示 span 文本两端是否有空白。
    pub(super) fn push_syllable(
        &mut self,
        syllable: LyricsSyllable,
        leading_space: bool,
        trailing_space: bool,
    ) {
        if leading_space || self.boundary_pending {
            self.flush();
        }
        self.current.push(syllable);
        self.boundary_pending = trailing_space;
    }

    /// 标记一个词边界，下一个音节将开始新词。
    pub(super) fn mark_boundary(&mut self) {
        self.boundary_pending = true;
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let syllables = std::mem::take(&mut self.current);
        let text: String = syllables.iter().map(|s| s.text.as_str()).collect();
        let time = syllables[0].time;
        let end_time = syllables.last().and_then(|s| s.end_time);

        self.words.push(LyricsWord {
            time,
            end_time,
            text,
            syllables: (syllables.len() > 1).then_some(syllables),
            transliteration: None,
        });
    }

    /// 结束组装，返回所有词。
    pub(super) fn finish(mut self) -> Vec<LyricsWord> {
        self.flush();
        self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syllable(time: f64, end: f64, text: &str) -> LyricsSyllable {
        LyricsSyllable {
            time,
            end_time: Some(end),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_adjacent_syllables_form_one_word() {
        let mut assembler = WordAssembler::default();
        assembler.push_syllable(syllable(1.0, 1.2, "syl"), false, false);
        assembler.push_syllable(syllable(1.2, 1.5, "la"), false, false);
        let words = assembler.finish();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "sylla");
        assert_eq!(words[0].end_time, Some(1.5));
        assert_eq!(words[0].syllables.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_boundaries_split_words() {
        let mut assembler = WordAssembler::default();
        assembler.push_syllable(syllable(1.0, 1.2, "Hello"), false, true);
        assembler.push_syllable(syllable(1.3, 1.5, "big"), false, false);
        assembler.mark_boundary();
        assembler.push_syllable(syllable(1.6, 1.8, "world"), false, false);
        assembler.push_syllable(syllable(1.9, 2.0, "again"), true, false);
        let words = assembler.finish();

        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "big", "world", "again"]);
        assert!(words.iter().all(|w| w.syllables.is_none()));
    }
}
