//! # TTML 解析器 - 事件处理器与分发器
//!
//! 该模块负责顶层的事件分发、全局状态管理和错误恢复。

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::debug;

use super::{
    body,
    constants::{
        ATTR_AGENT, ATTR_AGENT_ALIAS, ATTR_BEGIN, ATTR_END, ATTR_ITUNES_TIMING, ATTR_XML_LANG,
        TAG_BODY, TAG_METADATA, TAG_P, TAG_SPAN, TAG_TT, TIMING_WORD,
    },
    state::{BodyParseState, CurrentPElementData, LooseLine, MetadataContext, TtmlParserState},
    utils::{decode_entity, get_string_attribute, get_time_attribute},
};
use crate::converter::utils::normalize_text_whitespace;
use crate::error::LyricsError;
use crate::types::LyricsLine;

/// 处理全局事件（在 `<p>` 或 `<metadata>` 之外的事件）。
///
/// 识别根元素、body 和 p 的开始，并收集 `<p>` 之外的顶层计时 span。
pub(super) fn handle_global_event(
    event: &Event<'_>,
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
) -> Result<(), LyricsError> {
    match event {
        Event::Start(e) => match e.local_name().as_ref() {
            TAG_TT => process_tt_start(e, state, reader),
            TAG_METADATA => state.in_metadata = true,
            TAG_BODY => state.body_state.in_body = true,
            TAG_P => process_p_start(e, state, reader),
            TAG_SPAN => process_loose_span_start(e, state, reader),
            _ => {}
        },
        Event::Text(e) => {
            if let Some(loose) = state.body_state.loose_line.as_mut() {
                loose.text.push_str(&e.xml_content()?);
            }
        }
        Event::GeneralRef(e) => {
            if state.body_state.loose_line.is_some()
                && let Some(ch) = decode_entity(e.as_ref(), &mut state.warnings)?
                && let Some(loose) = state.body_state.loose_line.as_mut()
            {
                loose.text.push(ch);
            }
        }
        Event::End(e) => match e.local_name().as_ref() {
            TAG_BODY => state.body_state.in_body = false,
            TAG_SPAN => process_loose_span_end(state),
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// 处理 `<tt>` 标签，确定计时模式和文档语言。
fn process_tt_start(e: &BytesStart, state: &mut TtmlParserState, reader: &Reader<&[u8]>) {
    // 没有 itunes:timing 属性时沿用预扫描的结果
    let timing = get_string_attribute(e, reader, &[ATTR_ITUNES_TIMING], &mut state.warnings);
    if let Some(timing) = timing {
        state.word_timing_declared = timing.trim().eq_ignore_ascii_case(TIMING_WORD);
        debug!("itunes:timing = '{timing}'");
    }

    if let Some(lang) = get_string_attribute(e, reader, &[ATTR_XML_LANG], &mut state.warnings)
        && !lang.trim().is_empty()
    {
        state
            .metadata
            .entry("language".to_string())
            .or_insert_with(|| lang.trim().to_string());
    }
}

fn process_p_start(e: &BytesStart, state: &mut TtmlParserState, reader: &Reader<&[u8]>) {
    let begin = get_time_attribute(e, reader, &[ATTR_BEGIN], &mut state.warnings);
    let end = get_time_attribute(e, reader, &[ATTR_END], &mut state.warnings);
    let agent = get_string_attribute(
        e,
        reader,
        &[ATTR_AGENT, ATTR_AGENT_ALIAS],
        &mut state.warnings,
    )
    .filter(|a| !a.trim().is_empty());

    let body = &mut state.body_state;
    body.in_p = true;
    body.loose_line = None;
    body.span_stack.clear();
    body.current_p_element_data = Some(CurrentPElementData {
        begin,
        end,
        agent,
        ..Default::default()
    });
}

/// `<p>` 之外的 span：最外层的计时 span 各自成为一行。
fn process_loose_span_start(e: &BytesStart, state: &mut TtmlParserState, reader: &Reader<&[u8]>) {
    if let Some(loose) = state.body_state.loose_line.as_mut() {
        loose.depth += 1;
        return;
    }
    if let Some(begin) = get_time_attribute(e, reader, &[ATTR_BEGIN], &mut state.warnings) {
        let end = get_time_attribute(e, reader, &[ATTR_END], &mut state.warnings);
        state.body_state.loose_line = Some(LooseLine {
            begin,
            end,
            text: String::new(),
            depth: 1,
        });
    }
}

fn process_loose_span_end(state: &mut TtmlParserState) {
    let Some(loose) = state.body_state.loose_line.as_mut() else {
        return;
    };
    loose.depth -= 1;
    if loose.depth > 0 {
        return;
    }
    if let Some(loose) = state.body_state.loose_line.take() {
        let text = normalize_text_whitespace(&loose.text);
        if !text.is_empty() {
            state.loose_lines.push(LyricsLine {
                end_time: loose.end,
                ..LyricsLine::new(loose.begin, text)
            });
        }
    }
}

/// 尝试从一个XML格式错误中恢复。
pub(super) fn attempt_recovery_from_error(
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
    lines: &mut Vec<LyricsLine>,
    error: &quick_xml::errors::Error,
) {
    let position = reader.error_position();
    state
        .warnings
        .push(format!("TTML 格式错误，位置 {position}: {error}。"));

    if state.body_state.in_p {
        // 保存当前 <p> 中已经累积的数据，然后跳出这个 <p>
        let begin = state
            .body_state
            .current_p_element_data
            .as_ref()
            .and_then(|d| d.begin)
            .unwrap_or_default();
        state.warnings.push(format!(
            "错误发生在 <p> 元素内部 (开始于 {begin}s)。尝试恢复已经解析的数据。"
        ));
        body::handle_p_end(state, lines);
    } else if state.in_metadata {
        // 已经收集的翻译和音译保留，只放弃当前正在解析的部分
        state
            .warnings
            .push("错误发生在 <metadata> 块内部。放弃当前的元数据上下文。".to_string());
        state.in_metadata = false;
        state.metadata_state.context = MetadataContext::None;
        state.metadata_state.span_stack.clear();
    } else {
        state
            .warnings
            .push("错误发生在全局作用域。将重置解析器状态，尝试寻找下一个有效元素。".to_string());
        let in_body = state.body_state.in_body;
        state.body_state = BodyParseState {
            in_body,
            ..Default::default()
        };
    }
}

/// 判断文档中是否存在带时间的 `<span>`，用于在没有声明计时模式时推断逐字模式。
pub(super) fn has_timed_span_tags(content: &str) -> bool {
    content.match_indices("<span").any(|(start, _)| {
        let tag = &content[start..];
        let tag_end = tag.find('>').unwrap_or(tag.len());
        tag[..tag_end].contains("begin=")
    })
}

