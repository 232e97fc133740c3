//! Entity whose schema is supplied at runtime (from `EntityConfig`).

use crate::entity::{Entity, Record, Schema};

#[derive(Clone, Debug)]
pub struct DynamicEntity {
    table: String,
    record: Record,
}

impl DynamicEntity {
    pub fn new(table: impl Into<String>, schema: Schema) -> Self {
        DynamicEntity {
            table: table.into(),
            record: Record::from_schema(schema),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Entity for DynamicEntity {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
