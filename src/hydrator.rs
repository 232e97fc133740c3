//! Lazy conversion of fetched rows into plain values, serde types, JSON text or entities.

use crate::entity::Entity;
use crate::error::EntityError;
use crate::gateway::{PersistenceGateway, Row};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::rc::Rc;

/// Materialized result rows. Every view is recomputed from the rows, so iteration restarts freely.
#[derive(Clone, Default)]
pub struct RowHydrator {
    rows: Vec<Row>,
    path: Option<String>,
    gateway: Option<Rc<dyn PersistenceGateway>>,
}

impl std::fmt::Debug for RowHydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowHydrator")
            .field("rows", &self.rows.len())
            .field("path", &self.path)
            .field("gateway", &self.gateway.is_some())
            .finish()
    }
}

/// Walk a dotted path (`meta.tags.0`). JSON text met on the way is decoded.
fn walk(row: &Row, path: &str) -> Option<Value> {
    let mut segments = path.split('.');
    let mut current = row.get(segments.next()?)?.clone();
    for seg in segments {
        if let Value::String(text) = &current {
            current = serde_json::from_str(text).ok()?;
        }
        current = match current {
            Value::Object(mut map) => map.remove(seg)?,
            Value::Array(mut items) => {
                let idx = seg.parse::<usize>().ok()?;
                if idx >= items.len() {
                    return None;
                }
                items.swap_remove(idx)
            }
            _ => return None,
        };
    }
    Some(current)
}

impl RowHydrator {
    pub fn new(rows: Vec<Row>) -> Self {
        RowHydrator {
            rows,
            path: None,
            gateway: None,
        }
    }

    /// Gateway bound to every hydrated entity that has none yet.
    pub fn with_gateway(mut self, gateway: Rc<dyn PersistenceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Project every row through a dotted path. Missing paths yield null.
    pub fn project(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    fn projected(&self, row: &Row) -> Value {
        match &self.path {
            None => Value::Object(row.clone()),
            Some(path) => walk(row, path).unwrap_or(Value::Null),
        }
    }

    /// Raw (projected) values.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.rows.iter().map(|row| self.projected(row))
    }

    /// Each (projected) row deserialized into `T`.
    pub fn objects<T: DeserializeOwned>(&self) -> impl Iterator<Item = Result<T, EntityError>> + '_ {
        self.values().map(|v| Ok(serde_json::from_value(v)?))
    }

    /// Each (projected) row as JSON text.
    pub fn json(&self) -> impl Iterator<Item = String> + '_ {
        self.values().map(|v| v.to_string())
    }

    /// All (projected) rows as one JSON array.
    pub fn to_json(&self) -> String {
        Value::Array(self.values().collect()).to_string()
    }

    /// Entities of type `E`, each constructed fresh and hydrated from one row.
    pub fn entities<E: Entity + Default + 'static>(
        &self,
    ) -> Result<impl Iterator<Item = Result<E, EntityError>> + '_, EntityError> {
        self.entities_with(E::default)
    }

    /// Like [`entities`](Self::entities), for entity types built by a factory
    /// (e.g. `DynamicEntity` from config).
    pub fn entities_with<E, F>(
        &self,
        factory: F,
    ) -> Result<impl Iterator<Item = Result<E, EntityError>> + '_, EntityError>
    where
        E: Entity,
        F: Fn() -> E + 'static,
    {
        if factory().record().properties().is_empty() {
            return Err(EntityError::InvalidSchema(format!(
                "{} declares no properties",
                std::any::type_name::<E>()
            )));
        }
        Ok(self.rows.iter().map(move |row| self.hydrate_one(factory(), row)))
    }

    pub fn first_entity<E: Entity + Default + 'static>(&self) -> Result<Option<E>, EntityError> {
        self.entities::<E>()?.next().transpose()
    }

    pub fn entity_vec<E: Entity + Default + 'static>(&self) -> Result<Vec<E>, EntityError> {
        self.entities::<E>()?.collect()
    }

    fn hydrate_one<E: Entity>(&self, mut entity: E, row: &Row) -> Result<E, EntityError> {
        match self.projected(row) {
            Value::Object(map) => entity.from_map(&map),
            other => {
                return Err(EntityError::InvalidSchema(format!(
                    "cannot hydrate an entity from a non-object row: {}",
                    other
                )))
            }
        }
        if let Some(gateway) = &self.gateway {
            if !entity.record().has_gateway() {
                entity.record().bind_gateway(gateway.clone())?;
            }
        }
        Ok(entity)
    }
}
