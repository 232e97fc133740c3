//! Entity config validation and conversion into a runtime schema.

use crate::config::{EntityConfig, Settings};
use crate::entity::{DynamicEntity, Schema};
use crate::error::ConfigError;
use crate::sql::is_valid_identifier;
use std::collections::HashSet;

pub fn validate(config: &EntityConfig) -> Result<(), ConfigError> {
    if !is_valid_identifier(&config.table) {
        return Err(ConfigError::Validation(format!("table '{}' is not a plain identifier", config.table)));
    }
    if config.properties.is_empty() {
        return Err(ConfigError::Validation(format!("entity '{}' declares no properties", config.table)));
    }
    let mut seen = HashSet::new();
    for p in &config.properties {
        if !is_valid_identifier(&p.name) || p.name.contains('.') {
            return Err(ConfigError::Validation(format!("property '{}' is not a plain identifier", p.name)));
        }
        if !seen.insert(p.name.as_str()) {
            return Err(ConfigError::DuplicateProperty(p.name.clone()));
        }
    }
    Ok(())
}

impl EntityConfig {
    /// Validated schema, properties in config order.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        validate(self)?;
        let mut schema = Schema::new();
        for p in &self.properties {
            let d = schema.property(&p.name);
            d.kind(p.type_)
                .primary_if(p.primary)
                .unique_if(p.unique)
                .generated_if(p.generated);
            if let Some(v) = &p.default {
                d.default(v.clone());
            }
            if let Some(g) = &p.getter {
                d.getter(g.as_str());
            }
            if let Some(s) = &p.setter {
                d.setter(s.as_str());
            }
        }
        Ok(schema)
    }

    /// Fresh entity of this schema, table name prefixed per settings.
    pub fn instantiate(&self, settings: &Settings) -> Result<DynamicEntity, ConfigError> {
        Ok(DynamicEntity::new(settings.table_name(&self.table), self.schema()?))
    }
}
