//! Identity clause resolution (primary key, unique key fallback) and the write payload.

use crate::entity::Record;
use crate::error::EntityError;
use crate::gateway::{Row, WritePayload};
use crate::property::encode_for_write;
use serde_json::Value;

/// Which property set addressed the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    Primary,
    Unique,
}

/// AND-combined equality conditions addressing exactly one row.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityClause {
    pub source: IdentitySource,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl IdentityClause {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Record {
    /// Conditions for reload/delete. Primary properties win; unique properties are the
    /// fallback and must all be non-null. Fails before anything reaches storage.
    pub fn identity_clause(&self) -> Result<IdentityClause, EntityError> {
        let primary: Vec<usize> = self
            .properties()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_primary())
            .map(|(slot, _)| slot)
            .collect();

        if !primary.is_empty() {
            // null primaries are used as-is
            return Ok(IdentityClause {
                source: IdentitySource::Primary,
                columns: primary.iter().map(|&s| self.properties()[s].name().to_string()).collect(),
                values: primary
                    .iter()
                    .map(|&s| self.resolve_slot(s).unwrap_or(Value::Null))
                    .collect(),
            });
        }

        let unique: Vec<usize> = self
            .properties()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_unique())
            .map(|(slot, _)| slot)
            .collect();

        if unique.is_empty() {
            tracing::warn!("entity declares no primary or unique property");
            return Err(EntityError::MissingIdentity);
        }

        let mut clause = IdentityClause {
            source: IdentitySource::Unique,
            columns: Vec::with_capacity(unique.len()),
            values: Vec::with_capacity(unique.len()),
        };
        for slot in unique {
            let name = self.properties()[slot].name();
            let Some(value) = self.resolve_slot(slot) else {
                tracing::warn!(property = %name, "unique property is null, identity is ambiguous");
                return Err(EntityError::AmbiguousIdentity(name.to_string()));
            };
            clause.columns.push(name.to_string());
            clause.values.push(value);
        }
        Ok(clause)
    }

    /// Columns sent on save: everything except non-primary generated properties,
    /// with structured JSON encoded to text. `keys` is the identity set (primary
    /// properties, else unique ones); every other column is updated on conflict.
    pub fn write_payload(&self) -> WritePayload {
        let has_primary = self.properties().iter().any(|p| p.is_primary());
        let mut values = Row::new();
        let mut keys = Vec::new();
        for (slot, p) in self.properties().iter().enumerate() {
            let identity = if has_primary { p.is_primary() } else { p.is_unique() };
            if identity {
                keys.push(p.name().to_string());
            }
            if p.is_generated() && !p.is_primary() {
                continue;
            }
            let value = self.resolve_slot(slot).unwrap_or(Value::Null);
            values.insert(p.name().to_string(), encode_for_write(p.property_type(), value));
        }
        WritePayload { values, keys }
    }
}
