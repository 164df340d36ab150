//! Lenient value coercion for backend payloads.
//!
//! The backend contract is loose: counts arrive as numbers, numeric strings or
//! not at all, and labels may be numbers. These helpers turn any JSON value into
//! the scalar a record field expects without ever failing.

use serde_json::{Map, Number, Value};

/// Converts a value the way a browser `Number(value)` call would.
///
/// Returns `None` where that call would produce `NaN`.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => parse_numeric_str(&string_from_value(Some(single))),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| !n.is_nan() && !trimmed.to_ascii_lowercase().contains("inf")),
    }
}

/// Coerces a count field: missing, non-numeric, negative or non-finite input becomes 0.
pub fn count_from_value(value: Option<&Value>) -> f64 {
    value
        .and_then(number_from_value)
        .filter(|n| n.is_finite() && *n > 0.0)
        .unwrap_or(0.0)
}

/// Coerces a label field: `null` and missing become an empty string, anything
/// else is stringified.
pub fn string_from_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| string_from_value(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Coerces a quantity where `null` carries meaning.
///
/// Numbers and numeric strings yield `Some`; `null`, missing and unparseable
/// input yield `None`. Zero stays zero.
pub fn optional_quantity(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Coerces a year-like value into an integer, truncating fractional input.
pub fn integer_from_value(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Returns the first of `keys` present in `object` with a non-null value.
pub fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Returns true when any of `keys` exists in `object`, even with a `null` value.
pub fn has_any_key(object: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| object.contains_key(*key))
}
