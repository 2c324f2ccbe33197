//! # TTML 解析器的工具函数

use std::str;

use quick_xml::{
    Reader,
    events::{BytesStart, attributes::Attribute},
};

use crate::converter::utils::parse_timestamp;
use crate::error::LyricsError;

/// 从给定的属性名列表中获取第一个找到的属性，并将其转换为目标类型。
///
/// 属性格式错误或值无法解码时记录一条警告，并视为该属性不存在。
///
/// # 参数
/// * `e` - `BytesStart` 事件，代表一个 XML 标签的开始。
/// * `reader` - XML 读取器，用于解码。
/// * `attr_names` - 所有要尝试的属性名（包括别名），越靠前优先级越高。
/// * `warnings` - 警告列表。
/// * `processor` - 接收解码后的字符串值并返回目标类型的闭包。
pub(super) fn get_attribute_with_aliases<T, F>(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
    warnings: &mut Vec<String>,
    processor: F,
) -> Option<T>
where
    F: FnOnce(&str) -> T,
{
    let mut found: Option<(usize, Attribute<'_>)> = None;
    for attr in e.attributes().with_checks(false) {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                let message = format!(
                    "<{}> 元素的属性格式错误 ({err})，已忽略该属性。",
                    String::from_utf8_lossy(e.local_name().as_ref())
                );
                // 同一个元素会被多次查询属性，只记录一次
                if warnings.last() != Some(&message) {
                    warnings.push(message);
                }
                continue;
            }
        };
        let Some(rank) = attr_names
            .iter()
            .position(|&name| attr.key.as_ref() == name)
        else {
            continue;
        };
        if found.as_ref().is_none_or(|(best, _)| rank < *best) {
            found = Some((rank, attr));
        }
    }

    let (_, attr) = found?;
    match attr.decode_and_unescape_value(reader.decoder()) {
        Ok(value) => Some(processor(&value)),
        Err(err) => {
            warnings.push(format!(
                "属性 '{}' 的值无法解码 ({err})，已忽略该属性。",
                String::from_utf8_lossy(attr.key.as_ref())
            ));
            None
        }
    }
}

/// 获取字符串类型的属性值。
pub(super) fn get_string_attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
    warnings: &mut Vec<String>,
) -> Option<String> {
    get_attribute_with_aliases(e, reader, attr_names, warnings, ToOwned::to_owned)
}

/// 获取并解析为秒的时间属性。
///
/// 时间格式无效时记录一条警告并返回 `None`，由调用方跳过对应元素。
pub(super) fn get_time_attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
    warnings: &mut Vec<String>,
) -> Option<f64> {
    let value_str = get_string_attribute(e, reader, attr_names, warnings)?;
    match parse_timestamp(value_str.trim()) {
        Ok(seconds) => Some(seconds),
        Err(err) => {
            warnings.push(format!(
                "时间戳 '{value_str}' 解析失败 ({err}). 该时间戳将被忽略."
            ));
            None
        }
    }
}

/// 解码一个实体引用（`&amp;`、`&#x3042;` 等）。无法识别的实体返回 `None` 并记录警告。
pub(super) fn decode_entity(
    name: &[u8],
    warnings: &mut Vec<String>,
) -> Result<Option<char>, LyricsError> {
    let entity_name = str::from_utf8(name)
        .map_err(|err| LyricsError::Internal(format!("无法将实体名解码为UTF-8: {err}")))?;

    let decoded = if let Some(num_str) = entity_name.strip_prefix('#') {
        let (radix, code_point_str) = num_str
            .strip_prefix('x')
            .map_or((10, num_str), |stripped| (16, stripped));
        u32::from_str_radix(code_point_str, radix)
            .ok()
            .and_then(char::from_u32)
    } else {
        match entity_name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => None,
        }
    };

    if decoded.is_none() {
        warnings.push(format!("忽略了无法识别的XML实体 '&{entity_name};'"));
    }
    Ok(decoded)
}
