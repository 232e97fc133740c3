use crate::error::StorageError;
use crate::gateway::Row;
use crate::sql::QueryBuf;

/// Executes rendered statements against a database connection.
///
/// Metadata (`last_inserted_id`, `affected_rows`) describes the most recent `execute`.
pub trait Adapter {
    fn execute(&mut self, query: &QueryBuf) -> Result<bool, StorageError>;

    fn fetch(&mut self, query: &QueryBuf) -> Result<Vec<Row>, StorageError>;

    fn last_inserted_id(&self) -> Option<i64>;

    fn affected_rows(&self) -> u64;
}
