//! # TTML 解析器 - Metadata 处理模块
//!
//! 解析 `<metadata>` 块中的 `<iTunesMetadata>`（翻译、音译、词曲作者）和 `<meta>` 标签，
//! 并在所有行解析完成后把翻译与音译回填到对应的行和词上。

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::{debug, warn};

use super::{
    constants::{
        ATTR_BEGIN, ATTR_FOR, ATTR_KEY, ATTR_VALUE, ATTR_XML_LANG, TAG_ITUNES_METADATA, TAG_META,
        TAG_METADATA, TAG_SONGWRITER, TAG_SPAN, TAG_TEXT, TAG_TRANSLATION, TAG_TRANSLATIONS,
        TAG_TRANSLITERATION, TAG_TRANSLITERATIONS,
    },
    state::{AuxTrackType, AuxiliaryEntry, MetadataContext, SpanContext, SpanRole, TtmlParserState},
    utils::{decode_entity, get_string_attribute, get_time_attribute},
};
use crate::converter::utils::normalize_text_whitespace;
use crate::error::LyricsError;
use crate::types::{LyricsWord, ParsedLyrics};

/// 处理 `<metadata>` 块内部的事件。
pub(super) fn handle_metadata_event(
    event: &Event<'_>,
    reader: &Reader<&[u8]>,
    state: &mut TtmlParserState,
) -> Result<(), LyricsError> {
    match event {
        Event::Start(e) => handle_metadata_start_tag(e, reader, state),
        Event::Text(e) => {
            let text = e.xml_content()?;
            handle_metadata_text(&text, state);
        }
        Event::GeneralRef(e) => {
            if let Some(ch) = decode_entity(e.as_ref(), &mut state.warnings)? {
                let mut buf = [0u8; 4];
                handle_metadata_text(ch.encode_utf8(&mut buf), state);
            }
        }
        Event::End(e) => handle_metadata_end_tag(e.local_name().as_ref(), state),
        _ => {}
    }
    Ok(())
}

fn handle_metadata_start_tag(e: &BytesStart, reader: &Reader<&[u8]>, state: &mut TtmlParserState) {
    let meta_state = &mut state.metadata_state;

    match e.local_name().as_ref() {
        TAG_META => {
            let key = get_string_attribute(e, reader, &[ATTR_KEY], &mut state.warnings);
            let value = get_string_attribute(e, reader, &[ATTR_VALUE], &mut state.warnings);
            if let (Some(key), Some(value)) = (key, value)
                && !key.trim().is_empty()
                && !value.trim().is_empty()
            {
                state
                    .metadata
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }
        TAG_ITUNES_METADATA => meta_state.context = MetadataContext::InITunesMetadata,
        TAG_SONGWRITER => {
            if matches!(meta_state.context, MetadataContext::InITunesMetadata) {
                meta_state.context = MetadataContext::InSongwriter;
                meta_state.text_buffer.clear();
            }
        }
        TAG_TRANSLATIONS | TAG_TRANSLITERATIONS => {
            if matches!(meta_state.context, MetadataContext::InITunesMetadata) {
                let aux_type = if e.local_name().as_ref() == TAG_TRANSLATIONS {
                    AuxTrackType::Translation
                } else {
                    AuxTrackType::Transliteration
                };
                meta_state.context = MetadataContext::InAuxiliaryContainer { aux_type };
            }
        }
        TAG_TRANSLATION | TAG_TRANSLITERATION => {
            if let MetadataContext::InAuxiliaryContainer { aux_type } = meta_state.context {
                let lang =
                    get_string_attribute(e, reader, &[ATTR_XML_LANG], &mut state.warnings)
                        .filter(|l| !l.trim().is_empty());
                meta_state.context = MetadataContext::InAuxiliaryEntry { aux_type, lang };
            }
        }
        TAG_TEXT => {
            if !matches!(meta_state.context, MetadataContext::InAuxiliaryEntry { .. }) {
                return;
            }
            let key = get_string_attribute(e, reader, &[ATTR_FOR], &mut state.warnings);
            if let MetadataContext::InAuxiliaryEntry { aux_type, lang } =
                std::mem::take(&mut meta_state.context)
            {
                meta_state.current_text.clear();
                meta_state.current_timed_spans.clear();
                meta_state.span_stack.clear();
                meta_state.context = MetadataContext::InAuxiliaryText {
                    aux_type,
                    lang,
                    key,
                };
            }
        }
        TAG_SPAN => {
            if matches!(meta_state.context, MetadataContext::InAuxiliaryText { .. }) {
                let begin = get_time_attribute(e, reader, &[ATTR_BEGIN], &mut state.warnings);
                let meta_state = &mut state.metadata_state;
                if let Some(parent) = meta_state.span_stack.last_mut() {
                    parent.has_children = true;
                }
                meta_state.span_stack.push(SpanContext {
                    role: SpanRole::Generic,
                    begin,
                    end: None,
                    lang: None,
                    has_children: false,
                    text: String::new(),
                });
            }
        }
        _ => {}
    }
}

fn handle_metadata_text(text: &str, state: &mut TtmlParserState) {
    let meta_state = &mut state.metadata_state;
    match meta_state.context {
        MetadataContext::InSongwriter => meta_state.text_buffer.push_str(text),
        MetadataContext::InAuxiliaryText { .. } => {
            meta_state.current_text.push_str(text);
            if let Some(span) = meta_state.span_stack.last_mut() {
                span.text.push_str(text);
            }
        }
        _ => {}
    }
}

fn handle_metadata_end_tag(local_name: &[u8], state: &mut TtmlParserState) {
    let meta_state = &mut state.metadata_state;

    match local_name {
        TAG_METADATA => {
            state.in_metadata = false;
            meta_state.context = MetadataContext::None;
        }
        TAG_ITUNES_METADATA => meta_state.context = MetadataContext::None,
        TAG_SONGWRITER => {
            if matches!(meta_state.context, MetadataContext::InSongwriter) {
                let name = normalize_text_whitespace(&meta_state.text_buffer);
                if !name.is_empty() {
                    meta_state.songwriters.push(name);
                }
                meta_state.text_buffer.clear();
                meta_state.context = MetadataContext::InITunesMetadata;
            }
        }
        TAG_TRANSLATIONS | TAG_TRANSLITERATIONS => {
            if matches!(
                meta_state.context,
                MetadataContext::InAuxiliaryContainer { .. }
            ) {
                meta_state.context = MetadataContext::InITunesMetadata;
            }
        }
        TAG_TRANSLATION | TAG_TRANSLITERATION => {
            if let MetadataContext::InAuxiliaryEntry { aux_type, .. } = meta_state.context {
                meta_state.context = MetadataContext::InAuxiliaryContainer { aux_type };
            }
        }
        TAG_SPAN => {
            if let Some(span) = meta_state.span_stack.pop()
                && !span.has_children
                && let Some(begin) = span.begin
            {
                let text = span.text.trim();
                if !text.is_empty() {
                    meta_state.current_timed_spans.push((begin, text.to_string()));
                }
            }
        }
        TAG_TEXT => {
            if let MetadataContext::InAuxiliaryText {
                aux_type,
                lang,
                key,
            } = std::mem::take(&mut meta_state.context)
            {
                match key {
                    Some(key) => {
                        let entry = AuxiliaryEntry {
                            key,
                            lang: lang.clone(),
                            text: normalize_text_whitespace(&meta_state.current_text),
                            timed_spans: std::mem::take(&mut meta_state.current_timed_spans),
                        };
                        match aux_type {
                            AuxTrackType::Translation => meta_state.translations.push(entry),
                            AuxTrackType::Transliteration => {
                                meta_state.transliterations.push(entry);
                            }
                        }
                    }
                    None => state
                        .warnings
                        .push("跳过了一个缺少 for 属性的 <text> 元素。".to_string()),
                }
                meta_state.current_text.clear();
                meta_state.span_stack.clear();
                meta_state.context = MetadataContext::InAuxiliaryEntry { aux_type, lang };
            }
        }
        _ => {}
    }
}

/// 将 `L<n>` 形式的键解析为行索引 `n - 1`。
fn resolve_line_key(key: &str) -> Option<usize> {
    key.trim()
        .strip_prefix('L')
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
}

/// 把 `<translations>` 中的条目按位置回填到已排序的行上。已有翻译的行保持不变。
pub(super) fn apply_translations(parsed: &mut ParsedLyrics, entries: Vec<AuxiliaryEntry>) {
    for entry in entries {
        let Some(index) = resolve_line_key(&entry.key) else {
            parsed
                .warnings
                .push(format!("无法识别的翻译行键 '{}'，已跳过。", entry.key));
            continue;
        };
        let line_count = parsed.lines.len();
        let Some(line) = parsed.lines.get_mut(index) else {
            parsed.warnings.push(format!(
                "翻译行键 '{}' 超出范围 (共 {line_count} 行)，已跳过。",
                entry.key
            ));
            continue;
        };
        if entry.text.is_empty() {
            parsed
                .warnings
                .push(format!("翻译行键 '{}' 的文本为空，已跳过。", entry.key));
            continue;
        }
        if line.translation.is_some() {
            debug!("第 {} 行已有翻译，忽略重复的 '{}'", index + 1, entry.key);
            continue;
        }

        line.translation = Some(entry.text);
        parsed.has_translation = true;
        if parsed.translation_language.is_none() {
            parsed.translation_language = entry.lang;
        }
    }
}

/// 把 `<transliterations>` 中带时间的 span 匹配到开始时间最接近的词上。
pub(super) fn apply_transliterations(
    parsed: &mut ParsedLyrics,
    entries: Vec<AuxiliaryEntry>,
    tolerance: f64,
) {
    for entry in entries {
        let Some(index) = resolve_line_key(&entry.key) else {
            parsed
                .warnings
                .push(format!("无法识别的音译行键 '{}'，已跳过。", entry.key));
            continue;
        };
        let Some(words) = parsed
            .lines
            .get_mut(index)
            .and_then(|line| line.words.as_mut())
        else {
            parsed.warnings.push(format!(
                "音译行键 '{}' 没有对应的逐字歌词行，已跳过。",
                entry.key
            ));
            continue;
        };

        let mut matched: Vec<Option<String>> = vec![None; words.len()];
        for (time, text) in &entry.timed_spans {
            match nearest_word(words, *time, tolerance) {
                Some(word_index) => matched[word_index]
                    .get_or_insert_with(String::new)
                    .push_str(text),
                None => debug!("音译 '{text}' ({time}s) 没有找到时间相近的词"),
            }
        }

        let mut attached = false;
        for (word, transliteration) in words.iter_mut().zip(matched) {
            if word.transliteration.is_none()
                && let Some(transliteration) = transliteration
            {
                word.transliteration = Some(transliteration);
                attached = true;
            }
        }

        if attached {
            parsed.has_transliteration = true;
            if parsed.transliteration_language.is_none() {
                parsed.transliteration_language = entry.lang;
            }
        } else if !entry.timed_spans.is_empty() {
            warn!("音译行键 '{}' 的所有 span 都未能匹配到词", entry.key);
        }
    }
}

/// 找到开始时间与 `time` 最接近的词，差值必须在 `tolerance` 之内。
///
/// 多音节词的每个音节开始时间也参与匹配。
fn nearest_word(words: &[LyricsWord], time: f64, tolerance: f64) -> Option<usize> {
    const EPSILON: f64 = 1e-6;

    words
        .iter()
        .enumerate()
        .flat_map(|(i, word)| {
            std::iter::once(word.time)
                .chain(word.syllables.iter().flatten().map(|s| s.time))
                .map(move |t| (i, (t - time).abs()))
        })
        .filter(|&(_, distance)| distance <= tolerance + EPSILON)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
