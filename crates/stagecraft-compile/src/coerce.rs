//! Value coercion shared by the stage compilers.
//!
//! Text inputs arrive as strings; coercion order is fixed: numeric parse
//! first (trimmed, purely numeric strings only), then boolean literals
//! ("true"/"false", case-insensitive), else the string is kept as-is.
//!
//! Known ambiguity, preserved deliberately: numeric-looking strings that
//! are meant as strings (a zip code like "00501") coerce to numbers.
//! Changing the order would change observable pipelines everywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric literal pattern"));

/// Coerce one raw string: number, then boolean, else string.
pub fn coerce_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if NUMERIC.is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(number) = serde_json::Number::from_f64(f) {
                return Value::Number(number);
            }
        }
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}

/// Coerce a config value that may already be typed by a UI widget.
/// Strings go through scalar coercion; anything else is kept.
pub fn coerce_value(value: &Value) -> Value {
    match value {
        Value::String(s) => coerce_scalar(s),
        other => other.clone(),
    }
}

/// Parse a computed expression: a leading `$` is kept verbatim as a field
/// reference, otherwise scalar coercion applies.
pub fn coerce_expression(raw: &str) -> Value {
    if raw.trim_start().starts_with('$') {
        return Value::String(raw.to_string());
    }
    coerce_scalar(raw)
}

/// Split a comma-separated value into a coerced array. Used by the `in`
/// and `not-in` filter operators; empty segments are dropped.
pub fn coerce_list(raw: &str) -> Value {
    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(coerce_scalar)
        .collect();
    Value::Array(items)
}

/// Loose truthiness for option-like config values (checkboxes arrive as
/// booleans, text inputs as strings).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let t = s.trim();
            !t.is_empty() && !t.eq_ignore_ascii_case("false") && t != "0"
        }
        Value::Null => false,
        _ => true,
    }
}

/// Normalize a field path to carry a leading `$`.
pub fn field_reference(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('$') {
        trimmed.to_string()
    } else {
        format!("${trimmed}")
    }
}
