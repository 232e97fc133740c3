//! Entities: declared schema + values, persisted through a bound gateway.

mod dynamic;
mod identity;
mod record;

pub use dynamic::DynamicEntity;
pub use identity::{IdentityClause, IdentitySource};
pub use record::{Record, Schema};

use crate::error::EntityError;
use crate::gateway::Row;
use serde_json::Value;

/// Capability set of a persistable entity. Implementors own a `Record` declared in
/// their constructor and may override the lifecycle hooks.
///
/// ```ignore
/// struct User { record: Record }
///
/// impl User {
///     pub const ID: Field<i64> = Field::new("id");
///     pub const EMAIL: Field<String> = Field::new("email");
/// }
///
/// impl Default for User {
///     fn default() -> Self {
///         User {
///             record: Record::declare(|s| {
///                 s.property("id").int().primary().generated();
///                 s.property("email").string().unique();
///             }),
///         }
///     }
/// }
///
/// impl Entity for User {
///     fn record(&self) -> &Record { &self.record }
///     fn record_mut(&mut self) -> &mut Record { &mut self.record }
/// }
/// ```
pub trait Entity {
    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;

    fn before_save(&mut self) {}
    fn after_save(&mut self) {}
    fn before_reload(&mut self) {}
    fn after_reload(&mut self) {}
    fn before_delete(&mut self) {}
    fn after_delete(&mut self) {}

    /// Insert, or update the row holding a conflicting primary/unique key, in one statement.
    /// A freshly generated autoincrement id is written back into the primary property.
    fn save(&mut self) -> Result<bool, EntityError> {
        self.before_save();
        let saved = save_record(self.record_mut())?;
        self.after_save();
        Ok(saved)
    }

    /// Re-read the row addressed by the identity clause. Returns whether a row was found.
    fn reload(&mut self) -> Result<bool, EntityError> {
        self.before_reload();
        let found = reload_record(self.record_mut())?;
        self.after_reload();
        Ok(found)
    }

    /// Delete the row addressed by the identity clause, then clear every value.
    fn delete(&mut self) -> Result<bool, EntityError> {
        self.before_delete();
        let deleted = delete_record(self.record_mut())?;
        self.after_delete();
        Ok(deleted)
    }

    fn from_map(&mut self, data: &Row) {
        self.record_mut().from_map(data);
    }

    fn to_map(&self) -> Row {
        self.record().to_map()
    }

    fn from_value(&mut self, value: &Value) -> Result<(), EntityError> {
        self.record_mut().from_value(value)
    }

    fn to_value(&self) -> Value {
        self.record().to_value()
    }

    fn to_json(&self) -> String {
        self.record().to_json()
    }

    fn clear(&mut self) {
        self.record_mut().clear();
    }
}

fn save_record(record: &mut Record) -> Result<bool, EntityError> {
    let gateway = record.gateway()?;
    let payload = record.write_payload();
    let id_slots = record.generated_id_slots();

    let success = gateway.save_entity(&payload)?;
    let last_id = gateway.last_inserted_id()?.unwrap_or(0);
    let affected = gateway.affected_rows()?;

    if affected > 0 && last_id > 0 {
        for slot in id_slots {
            record.assign_slot(slot, Value::from(last_id));
        }
    }
    tracing::debug!(success, affected, last_id, "entity saved");
    Ok(success)
}

fn reload_record(record: &mut Record) -> Result<bool, EntityError> {
    let clause = record.identity_clause()?;
    let gateway = record.gateway()?;
    match gateway.reload_entity(&clause)? {
        Some(row) => {
            record.from_map(&row);
            tracing::debug!(columns = ?clause.columns, "entity reloaded");
            Ok(true)
        }
        None => {
            tracing::debug!(columns = ?clause.columns, "entity not found on reload");
            Ok(false)
        }
    }
}

fn delete_record(record: &mut Record) -> Result<bool, EntityError> {
    let clause = record.identity_clause()?;
    let gateway = record.gateway()?;
    let deleted = gateway.delete_entity(&clause)?;
    // cleared whether or not a row matched
    record.clear();
    tracing::debug!(columns = ?clause.columns, deleted, "entity deleted");
    Ok(deleted)
}
