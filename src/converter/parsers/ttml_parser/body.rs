//! # TTML 解析器 - Body 处理模块
//!
//! 处理 `<p>` 内部的 `<span>`、文本和实体引用，并在 `</p>` 时组装出一行歌词。
//!
//! 分词规则：相邻的计时 span 之间如果只隔着标签，就属于同一个词；
//! 中间出现任何空白或其它文本都会开始一个新词。

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::{debug, trace};

use super::{
    constants::{
        ATTR_BEGIN, ATTR_END, ATTR_ROLE, ATTR_ROLE_ALIAS, ATTR_XML_LANG, ROLE_BACKGROUND,
        ROLE_ROMANIZATION, ROLE_TRANSLATION, TAG_BR, TAG_P, TAG_SPAN,
    },
    state::{SpanContext, SpanRole, TtmlParserState},
    utils::{decode_entity, get_attribute_with_aliases, get_string_attribute, get_time_attribute},
};
use crate::converter::utils::normalize_text_whitespace;
use crate::error::LyricsError;
use crate::types::{LyricsLine, LyricsSyllable};

/// 处理在 `<p>` 标签内部的事件。
pub(super) fn handle_p_event(
    event: &Event<'_>,
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
    lines: &mut Vec<LyricsLine>,
) -> Result<(), LyricsError> {
    match event {
        Event::Start(e) => match e.local_name().as_ref() {
            TAG_SPAN => process_span_start(e, state, reader),
            // 换行等同于空白
            TAG_BR => handle_text(" ", state),
            _ => {}
        },
        Event::Text(e) => {
            let text = e.xml_content()?;
            handle_text(&text, state);
        }
        Event::GeneralRef(e) => {
            if let Some(ch) = decode_entity(e.as_ref(), &mut state.warnings)? {
                let mut buf = [0u8; 4];
                handle_text(ch.encode_utf8(&mut buf), state);
            }
        }
        Event::End(e) => match e.local_name().as_ref() {
            TAG_SPAN => process_span_end(state),
            TAG_P => handle_p_end(state, lines),
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// 处理 `<span>` 开始事件，压入新的 span 上下文。
fn process_span_start(e: &BytesStart, state: &mut TtmlParserState, reader: &Reader<&[u8]>) {
    let warnings = &mut state.warnings;
    let role = get_attribute_with_aliases(
        e,
        reader,
        &[ATTR_ROLE, ATTR_ROLE_ALIAS],
        warnings,
        |s| match s.as_bytes() {
            ROLE_TRANSLATION => SpanRole::Translation,
            ROLE_ROMANIZATION => SpanRole::Romanization,
            ROLE_BACKGROUND => SpanRole::Background,
            _ => SpanRole::Generic,
        },
    )
    .unwrap_or(SpanRole::Generic);

    let begin = get_time_attribute(e, reader, &[ATTR_BEGIN], warnings);
    let end = get_time_attribute(e, reader, &[ATTR_END], warnings);
    let lang = get_string_attribute(e, reader, &[ATTR_XML_LANG], warnings)
        .filter(|l| !l.trim().is_empty());

    let body = &mut state.body_state;
    if let Some(parent) = body.span_stack.last_mut()
        && !parent.has_children
    {
        // 父 span 变成容器。它在子 span 之前的文本相当于词之间的分隔
        parent.has_children = true;
        if !parent.text.is_empty()
            && !parent.role.is_auxiliary()
            && let Some(p_data) = body.current_p_element_data.as_mut()
        {
            p_data.words.mark_boundary();
        }
    }

    body.span_stack.push(SpanContext {
        role,
        begin,
        end,
        lang,
        has_children: false,
        text: String::new(),
    });
}

/// 处理 `<p>` 内的文本。
///
/// 翻译与罗马音 span 的文本只进入 span 自身的缓冲区，不计入行文本。
fn handle_text(text: &str, state: &mut TtmlParserState) {
    if text.is_empty() {
        return;
    }
    let body = &mut state.body_state;
    let Some(p_data) = body.current_p_element_data.as_mut() else {
        return;
    };

    let in_auxiliary = body.span_stack.iter().any(|s| s.role.is_auxiliary());
    if !in_auxiliary {
        p_data.line_text_accumulator.push_str(text);
    }

    match body.span_stack.last_mut() {
        Some(span) => {
            if span.has_children && !in_auxiliary {
                p_data.words.mark_boundary();
            }
            span.text.push_str(text);
        }
        // 段落级别的文本（包括空白）总是分隔两个词
        None => p_data.words.mark_boundary(),
    }
}

/// 处理 `</span>` 结束事件。叶子计时 span 会作为音节交给词组装器。
fn process_span_end(state: &mut TtmlParserState) {
    let word_mode = state.word_timing_declared;
    let body = &mut state.body_state;
    let Some(span) = body.span_stack.pop() else {
        debug!("忽略了多余的 </span>");
        return;
    };
    let Some(p_data) = body.current_p_element_data.as_mut() else {
        return;
    };

    // 翻译或罗马音 span 里嵌套的 span，文本归还给外层
    if let Some(parent) = body.span_stack.last_mut()
        && parent.role.is_auxiliary()
    {
        parent.text.push_str(&span.text);
        return;
    }

    match span.role {
        SpanRole::Translation => {
            let translation = normalize_text_whitespace(&span.text);
            if !translation.is_empty() && p_data.inline_translation.is_none() {
                p_data.inline_translation = Some(translation);
                if state.inline_translation_language.is_none() {
                    state.inline_translation_language = span.lang;
                }
            }
        }
        SpanRole::Romanization => {
            trace!("跳过行内罗马音 span: '{}'", span.text.trim());
        }
        SpanRole::Generic | SpanRole::Background => {
            if span.has_children || !word_mode {
                return;
            }
            let trimmed = span.text.trim();
            let Some(begin) = span.begin else {
                // 没有时间的 span 不产生音节，也不打断相邻关系，除非它只含空白
                if !span.text.is_empty() && trimmed.is_empty() {
                    p_data.words.mark_boundary();
                }
                return;
            };
            if trimmed.is_empty() {
                p_data.words.mark_boundary();
                return;
            }

            let leading_space = span.text.starts_with(char::is_whitespace);
            let trailing_space = span.text.ends_with(char::is_whitespace);
            p_data.words.push_syllable(
                LyricsSyllable {
                    time: begin,
                    end_time: span.end,
                    text: normalize_text_whitespace(trimmed),
                },
                leading_space,
                trailing_space,
            );
        }
    }
}

/// 处理 `</p>` 结束事件，生成一行歌词。
///
/// 出错恢复时也会调用它，以保留已经解析的部分。
pub(super) fn handle_p_end(state: &mut TtmlParserState, lines: &mut Vec<LyricsLine>) {
    let body = &mut state.body_state;
    body.in_p = false;
    body.span_stack.clear();
    let Some(p_data) = body.current_p_element_data.take() else {
        return;
    };

    let Some(begin) = p_data.begin else {
        state
            .warnings
            .push("跳过了一个没有有效 begin 属性的 <p> 元素。".to_string());
        return;
    };

    let text = normalize_text_whitespace(&p_data.line_text_accumulator);
    let words = p_data.words.finish();
    if text.is_empty() && words.is_empty() {
        state
            .warnings
            .push(format!("跳过了一个没有文本的 <p> 元素 (开始于 {begin}s)。"));
        return;
    }

    lines.push(LyricsLine {
        time: begin,
        end_time: p_data.end,
        text,
        words: (!words.is_empty()).then_some(words),
        agent: p_data.agent,
        translation: p_data.inline_translation,
    });
}
