//! Entity schema config as JSON: a table and its ordered properties.

use crate::property::PropertyType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: PropertyType,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub getter: Option<String>,
    #[serde(default)]
    pub setter: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub table: String,
    pub properties: Vec<PropertyConfig>,
}

impl EntityConfig {
    pub fn from_json(text: &str) -> Result<Self, crate::error::ConfigError> {
        serde_json::from_str(text).map_err(|e| crate::error::ConfigError::Load(e.to_string()))
    }
}
