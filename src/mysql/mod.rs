//! Blocking MySQL adapter over an sqlx pool.

mod bind;
mod decode;

pub use bind::MySqlBindValue;
pub use decode::row_to_map;

use crate::config::Settings;
use crate::error::StorageError;
use crate::gateway::{Adapter, Row};
use crate::sql::QueryBuf;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlPoolOptions};
use sqlx::query::Query;
use sqlx::MySql;
use tokio::runtime::Runtime;

/// Owns a private current-thread runtime, so each call blocks the calling worker
/// until the database answers. Not for use inside another async runtime.
pub struct MySqlAdapter {
    runtime: Runtime,
    pool: MySqlPool,
    last_insert_id: Option<i64>,
    affected_rows: u64,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("last_insert_id", &self.last_insert_id)
            .field("affected_rows", &self.affected_rows)
            .finish()
    }
}

fn bound(q: &QueryBuf) -> Query<'_, MySql, MySqlArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(MySqlBindValue::from_json(p));
    }
    query
}

impl MySqlAdapter {
    pub fn connect(settings: &Settings) -> Result<Self, StorageError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let pool = runtime.block_on(
            MySqlPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url),
        )?;
        tracing::info!(max_connections = settings.max_connections, "mysql pool ready");
        Ok(MySqlAdapter {
            runtime,
            pool,
            last_insert_id: None,
            affected_rows: 0,
        })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl Adapter for MySqlAdapter {
    fn execute(&mut self, q: &QueryBuf) -> Result<bool, StorageError> {
        let result = self.runtime.block_on(bound(q).execute(&self.pool))?;
        self.affected_rows = result.rows_affected();
        self.last_insert_id = i64::try_from(result.last_insert_id()).ok().filter(|&id| id > 0);
        tracing::debug!(affected = self.affected_rows, last_insert_id = ?self.last_insert_id, "executed");
        Ok(true)
    }

    fn fetch(&mut self, q: &QueryBuf) -> Result<Vec<Row>, StorageError> {
        let rows = self.runtime.block_on(bound(q).fetch_all(&self.pool))?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    fn last_inserted_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }
}
