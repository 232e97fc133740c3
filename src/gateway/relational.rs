//! Table-bound gateway: statement factories over an injected adapter, and the
//! upsert/reload/delete contract entities persist through.

use crate::entity::IdentityClause;
use crate::error::EntityError;
use crate::gateway::{Adapter, Bound, PersistenceGateway, Row, WritePayload};
use crate::sql::{is_valid_identifier, Call, Delete, Insert, QueryBuf, RawQuery, Replace, Select, Statement, Update};
use serde_json::Value;
use std::cell::RefCell;

pub struct RelationalGateway {
    table: String,
    adapter: RefCell<Option<Box<dyn Adapter>>>,
}

impl std::fmt::Debug for RelationalGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalGateway")
            .field("table", &self.table)
            .field("adapter_configured", &self.has_adapter())
            .finish()
    }
}

fn checked_table(table: &str) -> Result<String, EntityError> {
    if is_valid_identifier(table) {
        Ok(table.to_string())
    } else {
        Err(EntityError::InvalidIdentifier(table.to_string()))
    }
}

impl RelationalGateway {
    pub fn new(table: &str) -> Result<Self, EntityError> {
        Ok(RelationalGateway {
            table: checked_table(table)?,
            adapter: RefCell::new(None),
        })
    }

    pub fn with_adapter(self, adapter: impl Adapter + 'static) -> Self {
        self.set_adapter(adapter);
        self
    }

    /// Bind (or replace) the adapter every statement runs through.
    pub fn set_adapter(&self, adapter: impl Adapter + 'static) {
        *self.adapter.borrow_mut() = Some(Box::new(adapter));
    }

    pub fn has_adapter(&self) -> bool {
        self.adapter.borrow().is_some()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn set_table(&mut self, table: &str) -> Result<(), EntityError> {
        self.table = checked_table(table)?;
        Ok(())
    }

    fn not_configured(&self) -> EntityError {
        EntityError::AdapterNotConfigured(format!("no adapter bound to gateway for table '{}'", self.table))
    }

    pub(crate) fn execute(&self, q: &QueryBuf) -> Result<bool, EntityError> {
        tracing::debug!(table = %self.table, sql = %q.sql, params = ?q.params, "execute");
        let mut adapter = self.adapter.borrow_mut();
        let adapter = adapter.as_mut().ok_or_else(|| self.not_configured())?;
        Ok(adapter.execute(q)?)
    }

    pub(crate) fn fetch(&self, q: &QueryBuf) -> Result<Vec<Row>, EntityError> {
        tracing::debug!(table = %self.table, sql = %q.sql, params = ?q.params, "query");
        let mut adapter = self.adapter.borrow_mut();
        let adapter = adapter.as_mut().ok_or_else(|| self.not_configured())?;
        Ok(adapter.fetch(q)?)
    }

    pub fn select(&self, columns: &[&str]) -> Bound<'_, Select> {
        Bound::new(self, Select::new(&self.table, columns))
    }

    pub fn insert(&self, values: Row) -> Bound<'_, Insert> {
        Bound::new(self, Insert::new(&self.table, values))
    }

    pub fn update(&self, values: Row) -> Bound<'_, Update> {
        Bound::new(self, Update::new(&self.table, values))
    }

    pub fn delete(&self) -> Bound<'_, Delete> {
        Bound::new(self, Delete::new(&self.table))
    }

    pub fn replace(&self, values: Row) -> Bound<'_, Replace> {
        Bound::new(self, Replace::new(&self.table, values))
    }

    /// Stored procedure call. Not tied to the table.
    pub fn call(&self, procedure: &str, params: Vec<Value>) -> Bound<'_, Call> {
        Bound::new(self, Call::new(procedure, params))
    }

    /// Raw statement text with positional `?` parameters.
    pub fn query(&self, sql: &str, params: Vec<Value>) -> Bound<'_, RawQuery> {
        Bound::new(self, RawQuery::new(sql, params))
    }
}

impl PersistenceGateway for RelationalGateway {
    fn save_entity(&self, payload: &WritePayload) -> Result<bool, EntityError> {
        let q = Insert::new(&self.table, payload.values.clone())
            .on_duplicate_update(&payload.keys)
            .build();
        self.execute(&q)
    }

    fn reload_entity(&self, clause: &IdentityClause) -> Result<Option<Row>, EntityError> {
        let select = clause
            .iter()
            .fold(Select::new(&self.table, &["*"]), |s, (col, val)| s.where_eq(col, val.clone()))
            .limit(1);
        Ok(self.fetch(&select.build())?.into_iter().next())
    }

    fn delete_entity(&self, clause: &IdentityClause) -> Result<bool, EntityError> {
        let delete = clause
            .iter()
            .fold(Delete::new(&self.table), |d, (col, val)| d.where_eq(col, val.clone()));
        self.execute(&delete.build())
    }

    fn last_inserted_id(&self) -> Result<Option<i64>, EntityError> {
        let adapter = self.adapter.borrow();
        let adapter = adapter.as_ref().ok_or_else(|| self.not_configured())?;
        Ok(adapter.last_inserted_id())
    }

    fn affected_rows(&self) -> Result<u64, EntityError> {
        let adapter = self.adapter.borrow();
        let adapter = adapter.as_ref().ok_or_else(|| self.not_configured())?;
        Ok(adapter.affected_rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdentitySource;
    use crate::error::StorageError;
    use serde_json::json;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        queries: Vec<QueryBuf>,
    }

    struct Fixed {
        log: Rc<RefCell<Log>>,
        rows: Vec<Row>,
    }

    impl Adapter for Fixed {
        fn execute(&mut self, query: &QueryBuf) -> Result<bool, StorageError> {
            self.log.borrow_mut().queries.push(query.clone());
            Ok(true)
        }

        fn fetch(&mut self, query: &QueryBuf) -> Result<Vec<Row>, StorageError> {
            self.log.borrow_mut().queries.push(query.clone());
            Ok(self.rows.clone())
        }

        fn last_inserted_id(&self) -> Option<i64> {
            Some(7)
        }

        fn affected_rows(&self) -> u64 {
            1
        }
    }

    fn gateway(rows: Vec<Row>) -> (RelationalGateway, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let gw = RelationalGateway::new("users")
            .unwrap()
            .with_adapter(Fixed { log: log.clone(), rows });
        (gw, log)
    }

    fn clause() -> IdentityClause {
        IdentityClause {
            source: IdentitySource::Primary,
            columns: vec!["a".into(), "b".into()],
            values: vec![json!(1), json!(2)],
        }
    }

    #[test]
    fn rejects_non_identifier_tables() {
        assert!(matches!(RelationalGateway::new("users; drop"), Err(EntityError::InvalidIdentifier(_))));
        let (mut gw, _) = gateway(vec![]);
        assert!(gw.set_table("x y").is_err());
        assert_eq!(gw.table(), "users");
        gw.set_table("app.members").unwrap();
        assert_eq!(gw.table(), "app.members");
    }

    #[test]
    fn operations_without_adapter_fail() {
        let gw = RelationalGateway::new("users").unwrap();
        assert!(matches!(gw.affected_rows(), Err(EntityError::AdapterNotConfigured(_))));
        assert!(matches!(gw.reload_entity(&clause()), Err(EntityError::AdapterNotConfigured(_))));
    }

    #[test]
    fn reload_limits_to_one_row() {
        let (gw, log) = gateway(vec![Row::new(), Row::new()]);
        assert!(gw.reload_entity(&clause()).unwrap().is_some());
        let q = &log.borrow().queries[0];
        assert_eq!(q.sql, "SELECT * FROM `users` WHERE `a` = ? AND `b` = ? LIMIT 1");
        assert_eq!(q.params, vec![json!(1), json!(2)]);
    }

    #[test]
    fn delete_uses_every_condition() {
        let (gw, log) = gateway(vec![]);
        assert!(gw.delete_entity(&clause()).unwrap());
        assert_eq!(log.borrow().queries[0].sql, "DELETE FROM `users` WHERE `a` = ? AND `b` = ?");
    }

    #[test]
    fn save_is_a_single_upsert() {
        let (gw, log) = gateway(vec![]);
        let mut values = Row::new();
        values.insert("id".into(), Value::Null);
        values.insert("name".into(), json!("n"));
        let payload = WritePayload {
            values,
            keys: vec!["id".into()],
        };
        assert!(gw.save_entity(&payload).unwrap());
        assert_eq!(gw.last_inserted_id().unwrap(), Some(7));
        let log = log.borrow();
        assert_eq!(log.queries.len(), 1);
        assert_eq!(
            log.queries[0].sql,
            "INSERT INTO `users` (`id`, `name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
        );
    }
}
