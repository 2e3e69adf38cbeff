//! Lenient readers for backend JSON.
//!
//! Backend versions disagree on field names (`id`/`_id`, `role`/`type`) and on
//! envelopes (`[..]` vs `{ classes: [..] }`). Every resource goes through a
//! `FromWire` adapter so the rest of the crate only sees canonical types.

use chrono::{DateTime, Utc};
use serde_json::Value;

pub trait FromWire: Sized {
    /// Returns `None` when the value cannot represent the resource at all.
    fn from_wire(value: &Value) -> Option<Self>;
}

/// Items of a list response, bare or wrapped under the first matching key.
pub fn list_items(value: &Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => keys
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn adapt_list<T: FromWire>(value: &Value, keys: &[&str]) -> Vec<T> {
    let items = list_items(value, keys);
    let total = items.len();
    let adapted: Vec<T> = items.iter().filter_map(T::from_wire).collect();
    if adapted.len() < total {
        log::debug!("Skipped {} unreadable item(s)", total - adapted.len());
    }
    adapted
}

/// `res.subject ?? res`
pub fn unwrap_object<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value.get(key) {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

/// First present, non-null field among `keys`.
pub fn first_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
}

/// Scalar rendered as a string; objects and arrays are not scalars.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    first_field(value, keys).and_then(scalar_string)
}

/// Non-empty string field, trimmed.
pub fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    string_field(value, keys)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// RFC 3339 timestamp, normalised to UTC.
pub fn date_field(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    string_field(value, keys)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// `id ?? _id`, accepting numeric ids.
pub fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => string_field(value, &["id", "_id"]).filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Reference that may be populated (`{ _id, .. }`) or raw (`"abc"`).
pub fn reference_id(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(id_of)
}

/// Numbers and numeric strings; anything else (missing, malformed,
/// non-finite) reads as 0.
pub fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

pub fn number_field(value: &Value, keys: &[&str]) -> f64 {
    number(first_field(value, keys))
}

/// Like `number_field`, but distinguishes "absent" from 0.
pub fn optional_number(value: &Value, keys: &[&str]) -> Option<f64> {
    match first_field(value, keys) {
        Some(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub fn bool_field(value: &Value, keys: &[&str]) -> bool {
    match first_field(value, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}
