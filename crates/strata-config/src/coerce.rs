//! Conversion of raw environment/argument values into typed JSON values.

use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;
use strata_core::{Result, StrataError};

use crate::schema::ScalarType;

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});

static INTEGER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer regex"));

const FALSE_WORDS: [&str; 4] = ["false", "no", "0", ""];

/// Coerce a found value to the leaf's declared type.
///
/// `source_name` only labels parse errors (e.g. `env DATABASE_HOSTS`).
pub fn coerce(raw: Value, kind: Option<ScalarType>, source_name: &str) -> Result<Value> {
    let Some(kind) = kind else {
        return Ok(raw);
    };
    match kind {
        ScalarType::Number => Ok(to_number(raw)),
        ScalarType::Integer => Ok(to_integer(raw)),
        ScalarType::Boolean => Ok(Value::Bool(to_boolean(&raw))),
        ScalarType::Null => Ok(Value::Null),
        ScalarType::Object | ScalarType::Array => match raw {
            Value::String(text) => {
                serde_json::from_str(&text).map_err(|source| StrataError::Parse {
                    source_name: source_name.to_string(),
                    source,
                })
            }
            structured => Ok(structured),
        },
        ScalarType::String => Ok(raw),
    }
}

/// Leading floating-point prefix; anything unparseable is returned unchanged
/// so validation reports it.
fn to_number(raw: Value) -> Value {
    if raw.is_number() {
        return raw;
    }
    let Some(text) = raw.as_str() else {
        return raw;
    };
    let parsed = FLOAT_PREFIX
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(number_from_f64);
    parsed.unwrap_or(raw)
}

fn to_integer(raw: Value) -> Value {
    match &raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => raw,
        Value::Number(n) => n
            .as_f64()
            .map(f64::trunc)
            .and_then(number_from_f64)
            .unwrap_or(raw),
        Value::String(text) => INTEGER_PREFIX
            .find(text.trim_start())
            .and_then(|m| {
                let digits = m.as_str();
                digits
                    .parse::<i64>()
                    .map(Value::from)
                    .ok()
                    .or_else(|| digits.parse::<f64>().ok().and_then(number_from_f64))
            })
            .unwrap_or(raw),
        _ => raw,
    }
}

fn to_boolean(raw: &Value) -> bool {
    let text = display_text(raw);
    !FALSE_WORDS.contains(&text.as_str())
}

/// Lowercased text form tested against the false words: list items joined
/// with commas (nulls empty), objects opaque. `[]` and `[0]` read as false.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object]".to_string(),
    }
}

/// Whole numbers that fit an i64 are kept as JSON integers.
fn number_from_f64(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        return Some(Value::from(value as i64));
    }
    Number::from_f64(value).map(Value::Number)
}
