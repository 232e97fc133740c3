//! Builds parameterized MySQL SELECT, INSERT, REPLACE, UPDATE, DELETE and CALL statements.

use crate::gateway::Row;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Statement text with positional `?` parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params,
        }
    }

    fn push_param(&mut self, v: Value) -> &'static str {
        self.params.push(v);
        "?"
    }
}

/// Anything that renders to a `QueryBuf`.
pub trait Statement {
    fn build(&self) -> QueryBuf;
}

fn identifier_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$").ok())
        .as_ref()
}

/// Plain identifier, optionally schema-qualified (`db.table`).
pub fn is_valid_identifier(ident: &str) -> bool {
    identifier_pattern().is_some_and(|re| re.is_match(ident))
}

/// Quote identifier for MySQL.
fn quoted(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

/// Quote each dot-separated part (`db.table` -> `` `db`.`table` ``).
fn qualified(name: &str) -> String {
    name.split('.').map(quoted).collect::<Vec<_>>().join(".")
}

fn column_list(columns: &[String]) -> String {
    if columns.is_empty() {
        return "*".to_string();
    }
    columns
        .iter()
        .map(|c| if c == "*" { c.clone() } else { quoted(c) })
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(q: &mut QueryBuf, conditions: &[(String, Value)]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|(col, val)| format!("{} = {}", quoted(col), q.push_param(val.clone())))
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

fn limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut out = String::new();
    if let Some(n) = limit {
        out.push_str(&format!(" LIMIT {}", n));
    }
    if let Some(n) = offset {
        out.push_str(&format!(" OFFSET {}", n));
    }
    out
}

#[derive(Clone, Debug)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    conditions: Vec<(String, Value)>,
    order: Vec<(String, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn new(table: &str, columns: &[&str]) -> Self {
        Select {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl Statement for Select {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let where_sql = where_clause(&mut q, &self.conditions);
        let order_sql = if self.order.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = self
                .order
                .iter()
                .map(|(c, asc)| format!("{} {}", quoted(c), if *asc { "ASC" } else { "DESC" }))
                .collect();
            format!(" ORDER BY {}", parts.join(", "))
        };
        q.sql = format!(
            "SELECT {} FROM {}{}{}{}",
            column_list(&self.columns),
            qualified(&self.table),
            where_sql,
            order_sql,
            limit_clause(self.limit, self.offset)
        );
        q
    }
}

/// INSERT, optionally `IGNORE` and/or `ON DUPLICATE KEY UPDATE` (upsert).
#[derive(Clone, Debug)]
pub struct Insert {
    table: String,
    values: Row,
    ignore: bool,
    upsert: Option<Vec<String>>,
}

impl Insert {
    pub fn new(table: &str, values: Row) -> Self {
        Insert {
            table: table.to_string(),
            values,
            ignore: false,
            upsert: None,
        }
    }

    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    /// On a duplicate key update every inserted column except `keys` in place.
    pub fn on_duplicate_update(mut self, keys: &[String]) -> Self {
        self.upsert = Some(keys.to_vec());
        self
    }
}

fn values_clause(q: &mut QueryBuf, values: &Row) -> (String, String) {
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (col, val) in values {
        cols.push(quoted(col));
        placeholders.push(q.push_param(val.clone()));
    }
    (cols.join(", "), placeholders.join(", "))
}

impl Statement for Insert {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let (cols, placeholders) = values_clause(&mut q, &self.values);
        let mut sql = format!(
            "INSERT {}INTO {} ({}) VALUES ({})",
            if self.ignore { "IGNORE " } else { "" },
            qualified(&self.table),
            cols,
            placeholders
        );
        if let Some(keys) = &self.upsert {
            let mut sets: Vec<String> = self
                .values
                .keys()
                .filter(|c| !keys.contains(*c))
                .map(|c| format!("{0} = VALUES({0})", quoted(c)))
                .collect();
            if sets.is_empty() {
                // only key columns: make the duplicate a no-op
                if let Some(first) = self.values.keys().next() {
                    sets.push(format!("{0} = {0}", quoted(first)));
                }
            }
            if !sets.is_empty() {
                sql.push_str(" ON DUPLICATE KEY UPDATE ");
                sql.push_str(&sets.join(", "));
            }
        }
        q.sql = sql;
        q
    }
}

/// REPLACE: delete-then-insert on a duplicate key.
#[derive(Clone, Debug)]
pub struct Replace {
    table: String,
    values: Row,
}

impl Replace {
    pub fn new(table: &str, values: Row) -> Self {
        Replace {
            table: table.to_string(),
            values,
        }
    }
}

impl Statement for Replace {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let (cols, placeholders) = values_clause(&mut q, &self.values);
        q.sql = format!("REPLACE INTO {} ({}) VALUES ({})", qualified(&self.table), cols, placeholders);
        q
    }
}

#[derive(Clone, Debug)]
pub struct Update {
    table: String,
    values: Row,
    conditions: Vec<(String, Value)>,
    ignore: bool,
    limit: Option<u64>,
}

impl Update {
    pub fn new(table: &str, values: Row) -> Self {
        Update {
            table: table.to_string(),
            values,
            conditions: Vec::new(),
            ignore: false,
            limit: None,
        }
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Statement for Update {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let sets: Vec<String> = self
            .values
            .iter()
            .map(|(col, val)| format!("{} = {}", quoted(col), q.push_param(val.clone())))
            .collect();
        let where_sql = where_clause(&mut q, &self.conditions);
        q.sql = format!(
            "UPDATE {}{} SET {}{}{}",
            if self.ignore { "IGNORE " } else { "" },
            qualified(&self.table),
            sets.join(", "),
            where_sql,
            limit_clause(self.limit, None)
        );
        q
    }
}

#[derive(Clone, Debug)]
pub struct Delete {
    table: String,
    conditions: Vec<(String, Value)>,
    limit: Option<u64>,
}

impl Delete {
    pub fn new(table: &str) -> Self {
        Delete {
            table: table.to_string(),
            conditions: Vec::new(),
            limit: None,
        }
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Statement for Delete {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let where_sql = where_clause(&mut q, &self.conditions);
        q.sql = format!(
            "DELETE FROM {}{}{}",
            qualified(&self.table),
            where_sql,
            limit_clause(self.limit, None)
        );
        q
    }
}

/// CALL of a stored procedure with positional arguments.
#[derive(Clone, Debug)]
pub struct Call {
    procedure: String,
    params: Vec<Value>,
}

impl Call {
    pub fn new(procedure: &str, params: Vec<Value>) -> Self {
        Call {
            procedure: procedure.to_string(),
            params,
        }
    }
}

impl Statement for Call {
    fn build(&self) -> QueryBuf {
        let mut q = QueryBuf::default();
        let placeholders: Vec<&str> = self.params.iter().map(|p| q.push_param(p.clone())).collect();
        q.sql = format!("CALL {}({})", qualified(&self.procedure), placeholders.join(", "));
        q
    }
}

/// Raw statement text, passed through untouched.
#[derive(Clone, Debug)]
pub struct RawQuery {
    query: QueryBuf,
}

impl RawQuery {
    pub fn new(sql: &str, params: Vec<Value>) -> Self {
        RawQuery {
            query: QueryBuf::new(sql, params),
        }
    }
}

impl Statement for RawQuery {
    fn build(&self) -> QueryBuf {
        self.query.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        match v {
            Value::Object(m) => m,
            _ => Row::new(),
        }
    }

    #[test]
    fn select_with_conditions_and_limit() {
        let q = Select::new("users", &["*"])
            .where_eq("a", 1)
            .where_eq("b", "x")
            .order_by("a", false)
            .limit(1)
            .build();
        assert_eq!(q.sql, "SELECT * FROM `users` WHERE `a` = ? AND `b` = ? ORDER BY `a` DESC LIMIT 1");
        assert_eq!(q.params, vec![json!(1), json!("x")]);
    }

    #[test]
    fn select_quotes_columns_and_schema() {
        let q = Select::new("app.users", &["id", "na`me"]).build();
        assert_eq!(q.sql, "SELECT `id`, `na``me` FROM `app`.`users`");
    }

    #[test]
    fn upsert_skips_key_columns_in_update_list() {
        let q = Insert::new("users", row(json!({"id": null, "email": "a@b", "name": "A"})))
            .on_duplicate_update(&["id".to_string(), "email".to_string()])
            .build();
        assert_eq!(
            q.sql,
            "INSERT INTO `users` (`id`, `email`, `name`) VALUES (?, ?, ?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
        );
        assert_eq!(q.params, vec![Value::Null, json!("a@b"), json!("A")]);
    }

    #[test]
    fn upsert_with_only_keys_is_a_noop_update() {
        let q = Insert::new("tags", row(json!({"a": 1, "b": 2})))
            .on_duplicate_update(&["a".to_string(), "b".to_string()])
            .build();
        assert_eq!(q.sql, "INSERT INTO `tags` (`a`, `b`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `a` = `a`");
    }

    #[test]
    fn insert_ignore_and_replace() {
        let q = Insert::new("t", row(json!({"a": 1}))).ignore(true).build();
        assert_eq!(q.sql, "INSERT IGNORE INTO `t` (`a`) VALUES (?)");
        let q = Replace::new("t", row(json!({"a": 1}))).build();
        assert_eq!(q.sql, "REPLACE INTO `t` (`a`) VALUES (?)");
    }

    #[test]
    fn update_binds_sets_before_conditions() {
        let q = Update::new("t", row(json!({"name": "n"}))).where_eq("id", 4).limit(1).build();
        assert_eq!(q.sql, "UPDATE `t` SET `name` = ? WHERE `id` = ? LIMIT 1");
        assert_eq!(q.params, vec![json!("n"), json!(4)]);
    }

    #[test]
    fn delete_and_call() {
        let q = Delete::new("t").where_eq("a", 1).where_eq("b", 2).build();
        assert_eq!(q.sql, "DELETE FROM `t` WHERE `a` = ? AND `b` = ?");
        let q = Call::new("refresh_stats", vec![json!(1), json!("x")]).build();
        assert_eq!(q.sql, "CALL `refresh_stats`(?, ?)");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn identifier_pattern_is_compiled_once() {
        let first = identifier_pattern().unwrap() as *const Regex;
        assert!(is_valid_identifier("users"));
        assert_eq!(identifier_pattern().unwrap() as *const Regex, first);
    }

    #[test]
    fn identifier_validation() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("app.users_2"));
        assert!(!is_valid_identifier("users;drop"));
        assert!(!is_valid_identifier("1users"));
        assert!(!is_valid_identifier(""));
    }
}
