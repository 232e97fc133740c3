//! Typed property handles for compile-time checked accessors.

use crate::property::{TypedValue, DATE_FORMAT};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::marker::PhantomData;

/// Rust type a property is read as and written from.
pub trait PropertyKind: Sized {
    const EXPECTED: &'static str;

    fn from_typed(value: TypedValue) -> Result<Self, String>;
    fn into_value(self) -> Value;
}

/// Name of a declared property together with the Rust type it is accessed as.
///
/// Entities expose their properties as associated constants:
///
/// ```ignore
/// impl User {
///     pub const EMAIL: Field<String> = Field::new("email");
/// }
/// let email: Option<String> = user.record().get(User::EMAIL)?;
/// ```
pub struct Field<T> {
    name: &'static str,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str) -> Self {
        Field {
            name,
            _kind: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

fn mismatch(expected: &str, got: &TypedValue) -> String {
    format!("declared type does not yield {} (got {:?})", expected, got)
}

impl PropertyKind for String {
    const EXPECTED: &'static str = "string";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        match value {
            TypedValue::String(s) => Ok(s),
            TypedValue::Raw(v) | TypedValue::Json(v) => Ok(crate::property::to_text(v)),
            TypedValue::Int(n) => Ok(n.to_string()),
            TypedValue::Float(f) => Ok(f.to_string()),
            TypedValue::Date(d) => Ok(d.format(DATE_FORMAT).to_string()),
            other @ TypedValue::Bool(_) => Err(mismatch(Self::EXPECTED, &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl PropertyKind for i64 {
    const EXPECTED: &'static str = "int";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        match value {
            TypedValue::Int(n) => Ok(n),
            TypedValue::Raw(v) => crate::property::to_int(&v),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl PropertyKind for f64 {
    const EXPECTED: &'static str = "float";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        match value {
            TypedValue::Float(f) => Ok(f),
            TypedValue::Int(n) => Ok(n as f64),
            TypedValue::Raw(v) => crate::property::to_float(&v),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl PropertyKind for bool {
    const EXPECTED: &'static str = "bool";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        match value {
            TypedValue::Bool(b) => Ok(b),
            TypedValue::Raw(v) => crate::property::to_bool(&v),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl PropertyKind for NaiveDateTime {
    const EXPECTED: &'static str = "date";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        match value {
            TypedValue::Date(d) => Ok(d),
            TypedValue::Raw(v) => crate::property::to_date(&v),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self.format(DATE_FORMAT).to_string())
    }
}

/// Structured access; for `Json` properties textual values are already decoded.
impl PropertyKind for Value {
    const EXPECTED: &'static str = "json";

    fn from_typed(value: TypedValue) -> Result<Self, String> {
        Ok(match value {
            TypedValue::Json(v) | TypedValue::Raw(v) => v,
            TypedValue::String(s) => Value::String(s),
            TypedValue::Int(n) => Value::from(n),
            TypedValue::Float(f) => Value::from(f),
            TypedValue::Bool(b) => Value::Bool(b),
            TypedValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        })
    }

    fn into_value(self) -> Value {
        self
    }
}
