//! Value codec
//!
//! Maps a [`Value`] to its (tag, payload bytes) pair and back.

use super::{TypeTag, Value};
use crate::error::{McError, Result};

/// A value ready to be framed into a `set` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub tag: TypeTag,
    pub payload: Vec<u8>,
}

/// Encode a value into its tag and payload.
///
/// Scalars use their decimal text form. Strings, sequences, objects and
/// null go through JSON, which never emits a raw newline, so the payload
/// always fits on a single protocol line.
///
/// A bare non-finite float is stored as `NaN` / `inf` text and comes back
/// intact. Inside a sequence or object JSON has no form for it, so it is
/// refused with `InvalidArgument` rather than silently stored as `null`.
pub fn encode(value: &Value) -> Result<Encoded> {
    if let Value::Sequence(_) | Value::Object(_) = value {
        check_nested_floats(value)?;
    }

    let payload = match value {
        Value::Int(i) => i.to_string().into_bytes(),
        Value::Float(x) => x.to_string().into_bytes(),
        Value::Bool(true) => b"1".to_vec(),
        Value::Bool(false) => Vec::new(),
        Value::Text(_) | Value::Sequence(_) | Value::Object(_) | Value::Null => {
            serde_json::to_vec(value)?
        }
    };

    Ok(Encoded {
        tag: value.type_tag(),
        payload,
    })
}

/// Decode a payload stored under the given flags.
///
/// Flags that are not one of ours pass the payload through as text.
pub fn decode(payload: &[u8], flags: u32) -> Result<Value> {
    let tag = match TypeTag::from_flags(flags) {
        Some(tag) => tag,
        None => return Ok(Value::Text(String::from_utf8_lossy(payload).into_owned())),
    };

    match tag {
        TypeTag::Null => Ok(Value::Null),
        TypeTag::Bool => Ok(Value::Bool(!payload.is_empty())),
        TypeTag::Int => {
            let text = scalar_text(payload, tag)?;
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| decode_error(tag, e))
        }
        TypeTag::Float => {
            let text = scalar_text(payload, tag)?;
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| decode_error(tag, e))
        }
        // A sequence written by a client with sparse array keys arrives as
        // a JSON object; it decodes to `Object` rather than failing.
        TypeTag::String | TypeTag::Sequence | TypeTag::Object => {
            serde_json::from_slice::<Value>(payload).map_err(|e| decode_error(tag, e))
        }
    }
}

fn check_nested_floats(value: &Value) -> Result<()> {
    match value {
        Value::Float(x) if !x.is_finite() => Err(McError::InvalidArgument(format!(
            "{} cannot be stored inside a sequence or object",
            x
        ))),
        Value::Sequence(items) => items.iter().try_for_each(check_nested_floats),
        Value::Object(map) => map.values().try_for_each(check_nested_floats),
        _ => Ok(()),
    }
}

fn scalar_text(payload: &[u8], tag: TypeTag) -> Result<&str> {
    std::str::from_utf8(payload)
        .map(str::trim)
        .map_err(|e| decode_error(tag, e))
}

fn decode_error(tag: TypeTag, reason: impl ToString) -> McError {
    McError::Decode {
        tag,
        reason: reason.to_string(),
    }
}
