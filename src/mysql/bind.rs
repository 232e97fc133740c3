//! Convert serde_json::Value to a value sqlx can bind to a MySQL statement.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::mysql::{MySql, MySqlTypeInfo};
use sqlx::{Database, Type};

/// One positional parameter. Arrays and objects go over the wire as JSON text.
#[derive(Clone, Debug, PartialEq)]
pub enum MySqlBindValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
}

impl MySqlBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => MySqlBindValue::Null,
            Value::Bool(b) => MySqlBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MySqlBindValue::I64(i)
                } else if let Some(u) = n.as_u64() {
                    MySqlBindValue::U64(u)
                } else {
                    MySqlBindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => MySqlBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => MySqlBindValue::String(v.to_string()),
        }
    }
}

impl<'q> Encode<'q, MySql> for MySqlBindValue {
    fn encode_by_ref(&self, buf: &mut <MySql as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        match self {
            MySqlBindValue::Null => <Option<i64> as Encode<MySql>>::encode_by_ref(&None, buf),
            MySqlBindValue::Bool(b) => <bool as Encode<MySql>>::encode_by_ref(b, buf),
            MySqlBindValue::I64(n) => <i64 as Encode<MySql>>::encode_by_ref(n, buf),
            MySqlBindValue::U64(n) => <u64 as Encode<MySql>>::encode_by_ref(n, buf),
            MySqlBindValue::F64(n) => <f64 as Encode<MySql>>::encode_by_ref(n, buf),
            MySqlBindValue::String(s) => <&str as Encode<MySql>>::encode_by_ref(&s.as_str(), buf),
        }
    }

    fn produces(&self) -> Option<MySqlTypeInfo> {
        Some(match self {
            MySqlBindValue::Null | MySqlBindValue::I64(_) => <i64 as Type<MySql>>::type_info(),
            MySqlBindValue::Bool(_) => <bool as Type<MySql>>::type_info(),
            MySqlBindValue::U64(_) => <u64 as Type<MySql>>::type_info(),
            MySqlBindValue::F64(_) => <f64 as Type<MySql>>::type_info(),
            MySqlBindValue::String(_) => <str as Type<MySql>>::type_info(),
        })
    }
}

impl Type<MySql> for MySqlBindValue {
    fn type_info() -> MySqlTypeInfo {
        <str as Type<MySql>>::type_info()
    }
}
