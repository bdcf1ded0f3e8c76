//! Lenient accessors over vendor JSON bodies
//!
//! Vendor payloads drift between API versions; these helpers never fail,
//! they just report absence.

use serde_json::{Map, Value};

/// Get a nested value using a dot-separated path (`usage.prompt_tokens`).
/// Numeric segments index into arrays (`choices.0.message`).
pub fn get_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;
    for key in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(key)?,
        };
    }
    if current.is_null() { None } else { Some(current) }
}

/// Read an unsigned integer, tolerating floats and numeric strings.
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64),
        _ => None,
    }
}

/// Read a float, tolerating numeric strings (`"4"` seconds).
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn u64_at(json: &Value, path: &str) -> Option<u64> {
    get_path(json, path).and_then(as_u64)
}

pub fn f64_at(json: &Value, path: &str) -> Option<f64> {
    get_path(json, path).and_then(as_f64)
}

pub fn str_at<'a>(json: &'a Value, path: &str) -> Option<&'a str> {
    get_path(json, path).and_then(Value::as_str)
}

pub fn string_at(json: &Value, path: &str) -> Option<String> {
    str_at(json, path).map(str::to_string)
}

pub fn array_at<'a>(json: &'a Value, path: &str) -> &'a [Value] {
    get_path(json, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First of several candidate paths that yields a number.
pub fn first_u64(json: &Value, paths: &[&str]) -> Option<u64> {
    paths.iter().find_map(|p| u64_at(json, p))
}

/// Overlay `fields` onto `target`, skipping nulls. Nested objects are merged
/// recursively so a partial usage object never erases sibling counters.
pub fn overlay(target: &mut Map<String, Value>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => overlay(existing, incoming),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Overlay a JSON object value; non-objects are ignored.
pub fn overlay_value(target: &mut Map<String, Value>, fields: Option<&Value>) {
    if let Some(Value::Object(map)) = fields {
        overlay(target, map);
    }
}

/// Join non-empty text fragments with newlines.
pub fn join_text<I, S>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = parts
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.is_empty() { None } else { Some(joined) }
}
