//! Property type tags and read-time coercion of stored values.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text form used when a date is written back to storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Declared type of a property. Drives coercion on read and encoding on write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Json,
    /// Untyped: values pass through unchanged.
    #[default]
    Raw,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Int => "int",
            PropertyType::Float => "float",
            PropertyType::Bool => "bool",
            PropertyType::Date => "date",
            PropertyType::Json => "json",
            PropertyType::Raw => "raw",
        }
    }

    /// Whether a primary property of this type may receive an autoincrement id.
    pub fn accepts_generated_id(self) -> bool {
        matches!(self, PropertyType::Int | PropertyType::Raw)
    }
}

/// A resolved value coerced to its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
    Json(Value),
    Raw(Value),
}

/// Coerce a non-null stored value to the given type. Errors carry a short reason.
pub fn coerce(kind: PropertyType, value: Value) -> Result<TypedValue, String> {
    Ok(match kind {
        PropertyType::String => TypedValue::String(to_text(value)),
        PropertyType::Int => TypedValue::Int(to_int(&value)?),
        PropertyType::Float => TypedValue::Float(to_float(&value)?),
        PropertyType::Bool => TypedValue::Bool(to_bool(&value)?),
        PropertyType::Date => TypedValue::Date(to_date(&value)?),
        PropertyType::Json => TypedValue::Json(decode_json(value)?),
        PropertyType::Raw => TypedValue::Raw(value),
    })
}

pub fn to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Bool(b) => if b { "1".into() } else { String::new() },
        other => other.to_string(),
    }
}

/// Truncate toward zero; values outside `i64` are rejected rather than saturated.
fn float_to_int(f: f64) -> Option<i64> {
    let t = f.trunc();
    // 2^63 is exactly representable; i64::MAX as f64 rounds up to it
    if t.is_finite() && t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
        Some(t as i64)
    } else {
        None
    }
}

pub fn to_int(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| if n.is_u64() { None } else { n.as_f64().and_then(float_to_int) })
            .ok_or_else(|| format!("{} is out of range", n)),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let t = s.trim();
            match t.parse::<i64>() {
                Ok(n) => Ok(n),
                Err(_) => match t.parse::<f64>() {
                    Ok(f) => float_to_int(f).ok_or_else(|| format!("'{}' is out of range", s)),
                    Err(_) => Err(format!("'{}' is not a number", s)),
                },
            }
        }
        other => Err(format!("{} has no integer form", json_kind(other))),
    }
}

pub fn to_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is out of range", n)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", s)),
        other => Err(format!("{} has no float form", json_kind(other))),
    }
}

pub fn to_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "off" | "no" => Ok(false),
            "1" | "true" | "on" | "yes" => Ok(true),
            _ => Err(format!("'{}' is not a boolean", s)),
        },
        Value::Array(a) => Ok(!a.is_empty()),
        Value::Object(o) => Ok(!o.is_empty()),
        Value::Null => Ok(false),
    }
}

/// Parse a stored date: MySQL DATETIME text, ISO-8601 with or without offset,
/// a plain date (midnight), or a unix timestamp in seconds.
pub fn to_date(value: &Value) -> Result<NaiveDateTime, String> {
    match value {
        Value::String(s) => parse_date(s.trim()).ok_or_else(|| format!("'{}' is not a date", s)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|d| d.naive_utc())
            .ok_or_else(|| format!("{} is not a unix timestamp", n)),
        other => Err(format!("{} has no date form", json_kind(other))),
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(d) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    for fmt in DATE_INPUT_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse textual JSON; structured values pass through unchanged.
pub fn decode_json(value: Value) -> Result<Value, String> {
    match value {
        Value::String(s) => serde_json::from_str(&s).map_err(|e| e.to_string()),
        other => Ok(other),
    }
}

/// Write-time encoding: structured JSON becomes text before it reaches storage.
pub fn encode_for_write(kind: PropertyType, value: Value) -> Value {
    match (kind, value) {
        (PropertyType::Json, v @ (Value::Array(_) | Value::Object(_))) => Value::String(v.to_string()),
        (_, v) => v,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
