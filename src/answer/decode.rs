//! Decode-with-fallback for answer payloads.
//!
//! The service returns its structured answer in one of three shapes: the
//! structure directly, the structure wrapped in an object, or a JSON string
//! that itself encodes the structure. These routines are total: every input
//! maps to either the expected structure or a well-defined empty sentinel;
//! partially-parsed values never escape.

use serde_json::{Map, Value};

/// Decode an answer expected to be an array of per-item objects.
///
/// Shape handling, in order:
/// 1. array: used directly;
/// 2. object: the array under `array_key` if present, otherwise the object
///    itself as a single-item result;
/// 3. string: re-parsed as JSON and decoded again; an unparseable string
///    yields the empty sentinel.
pub fn decode_array_answer(answer: &Value, array_key: &str) -> Vec<Value> {
    match answer {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get(array_key) {
            Some(Value::Array(items)) => items.clone(),
            _ => vec![answer.clone()],
        },
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            // Guard against a string that parses to another string
            Ok(parsed) if !matches!(parsed, Value::String(_)) => {
                decode_array_answer(&parsed, array_key)
            }
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Decode an answer expected to be a single structured object.
///
/// The same three shapes apply: an object is used directly, an array yields
/// its first object, and a string is re-parsed as JSON.
pub fn decode_object_answer(answer: &Value) -> Option<Map<String, Value>> {
    match answer {
        Value::Object(map) => Some(map.clone()),
        Value::Array(items) => items.first().and_then(|v| v.as_object().cloned()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Some(map),
            Ok(Value::Array(items)) => items.first().and_then(|v| v.as_object().cloned()),
            _ => None,
        },
        _ => None,
    }
}

/// String field of a decoded object, "" when missing or non-string.
pub fn str_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
