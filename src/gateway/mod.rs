//! Persistence gateways: the narrow contract entities persist through, and the
//! table-bound relational implementation over a storage adapter.

mod adapter;
mod bound;
mod relational;

pub use adapter::Adapter;
pub use bound::Bound;
pub use relational::RelationalGateway;

use crate::entity::IdentityClause;
use crate::error::EntityError;

/// One raw row: column name to value, in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Column values sent on save, plus the names of identity columns (primary and unique)
/// that an upsert must leave untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WritePayload {
    pub values: Row,
    pub keys: Vec<String>,
}

/// What an entity needs from storage. Implementations know a table, not entities.
pub trait PersistenceGateway {
    /// Insert, or update the row matching a primary/unique key, in one statement.
    fn save_entity(&self, payload: &WritePayload) -> Result<bool, EntityError>;

    /// At most one row matching every condition of the clause.
    fn reload_entity(&self, clause: &IdentityClause) -> Result<Option<Row>, EntityError>;

    fn delete_entity(&self, clause: &IdentityClause) -> Result<bool, EntityError>;

    fn last_inserted_id(&self) -> Result<Option<i64>, EntityError>;

    fn affected_rows(&self) -> Result<u64, EntityError>;
}
