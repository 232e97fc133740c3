//! Decode MySQL rows into column -> value mappings.

use crate::gateway::Row;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row as _, TypeInfo};

pub fn row_to_map(row: &MySqlRow) -> Row {
    let mut map = Row::new();
    for (idx, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), cell_to_value(row, idx));
    }
    map
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn is_json_column(row: &MySqlRow, idx: usize) -> bool {
    column_is_json(row.column(idx).type_info().name())
}

fn column_is_json(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case("JSON")
}

fn cell_to_value(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(idx) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<u64>, _>(idx) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(idx) {
        return number(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(idx) {
        return number(n as f64);
    }
    if let Ok(Some(d)) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return Value::String(d.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = row.try_get::<Option<NaiveTime>, _>(idx) {
        return Value::String(t.format("%H:%M:%S").to_string());
    }
    // only JSON columns decode structurally; text stays text
    if is_json_column(row, idx) {
        if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(idx) {
            return j;
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(idx) {
        return Value::String(s);
    }
    // DECIMAL and friends: text protocol form
    if let Ok(Some(s)) = row.try_get_unchecked::<Option<String>, _>(idx) {
        return Value::String(s);
    }
    // invalid UTF-8 is replaced, not rejected
    if let Ok(Some(bytes)) = row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}
