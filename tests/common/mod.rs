#![allow(dead_code)]

use entity_gateway::{Adapter, Entity, QueryBuf, Record, RelationalGateway, Row, StorageError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What the recording adapter saw, and what it answers next.
#[derive(Default)]
pub struct Journal {
    pub executed: Vec<QueryBuf>,
    pub fetched: Vec<QueryBuf>,
    pub results: VecDeque<Vec<Row>>,
    pub last_insert_id: Option<i64>,
    pub affected_rows: u64,
    pub fail_with: Option<String>,
}

impl Journal {
    pub fn calls(&self) -> usize {
        self.executed.len() + self.fetched.len()
    }
}

pub struct RecordingAdapter {
    journal: Rc<RefCell<Journal>>,
}

impl RecordingAdapter {
    pub fn new() -> (Self, Rc<RefCell<Journal>>) {
        let journal = Rc::new(RefCell::new(Journal::default()));
        (
            RecordingAdapter {
                journal: journal.clone(),
            },
            journal,
        )
    }
}

impl Adapter for RecordingAdapter {
    fn execute(&mut self, query: &QueryBuf) -> Result<bool, StorageError> {
        let mut j = self.journal.borrow_mut();
        j.executed.push(query.clone());
        match &j.fail_with {
            Some(msg) => Err(StorageError::Execution(msg.clone())),
            None => Ok(true),
        }
    }

    fn fetch(&mut self, query: &QueryBuf) -> Result<Vec<Row>, StorageError> {
        let mut j = self.journal.borrow_mut();
        j.fetched.push(query.clone());
        if let Some(msg) = &j.fail_with {
            return Err(StorageError::Execution(msg.clone()));
        }
        Ok(j.results.pop_front().unwrap_or_default())
    }

    fn last_inserted_id(&self) -> Option<i64> {
        self.journal.borrow().last_insert_id
    }

    fn affected_rows(&self) -> u64 {
        self.journal.borrow().affected_rows
    }
}

/// Test-writer subscriber, filtered by `RUST_LOG` (default `entity_gateway=debug`).
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("entity_gateway=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Gateway for `table` over a fresh recording adapter.
pub fn gateway(table: &str) -> (Rc<RelationalGateway>, Rc<RefCell<Journal>>) {
    init_tracing();
    let (adapter, journal) = RecordingAdapter::new();
    let gw = RelationalGateway::new(table).expect("valid table").with_adapter(adapter);
    (Rc::new(gw), journal)
}

pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

/// Entity with an autoincrement key, a unique email, a JSON column and a
/// storage-generated timestamp. Counts hook invocations.
pub struct User {
    record: Record,
    pub hooks: Vec<&'static str>,
}

impl Default for User {
    fn default() -> Self {
        User {
            record: Record::declare(|s| {
                s.property("id").int().primary().generated();
                s.property("email").string().unique();
                s.property("name").string().default("anonymous");
                s.property("meta").json();
                s.property("created_at").date().generated();
            }),
            hooks: Vec::new(),
        }
    }
}

impl Entity for User {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn before_save(&mut self) {
        self.hooks.push("before_save");
    }

    fn after_save(&mut self) {
        self.hooks.push("after_save");
    }

    fn before_reload(&mut self) {
        self.hooks.push("before_reload");
    }

    fn after_reload(&mut self) {
        self.hooks.push("after_reload");
    }

    fn before_delete(&mut self) {
        self.hooks.push("before_delete");
    }

    fn after_delete(&mut self) {
        self.hooks.push("after_delete");
    }
}

/// Composite primary key, no autoincrement.
pub struct Membership {
    record: Record,
}

impl Default for Membership {
    fn default() -> Self {
        Membership {
            record: Record::declare(|s| {
                s.property("group_id").int().primary();
                s.property("user_id").int().primary();
                s.property("role").string();
            }),
        }
    }
}

impl Entity for Membership {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// No primary or unique property.
pub struct LogLine {
    record: Record,
}

impl Default for LogLine {
    fn default() -> Self {
        LogLine {
            record: Record::declare(|s| {
                s.property("message").string();
            }),
        }
    }
}

impl Entity for LogLine {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// Declares nothing.
pub struct Empty {
    record: Record,
}

impl Default for Empty {
    fn default() -> Self {
        Empty {
            record: Record::declare(|_| {}),
        }
    }
}

impl Entity for Empty {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
