//! Shared in-memory connection double for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};

use crate::connection::{Connection, Dialect, Row};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Scriptable [`Connection`] that records every statement.
///
/// It understands just enough DDL/bookkeeping SQL to support the migrator
/// tests: table creation and dropping, existence probes, and the
/// `migrations(name, batch)` table. Everything else is driven by
/// [`FakeConnection::queue_result`], `rows_affected`, and `next_insert_id`.
pub(crate) struct FakeConnection {
    dialect: Dialect,
    pub log: RefCell<Vec<(String, Vec<Value>)>>,
    pub tables: RefCell<BTreeSet<String>>,
    records: RefCell<Vec<(String, i64)>>,
    pub next_insert_id: Cell<i64>,
    pub rows_affected: Cell<u64>,
    pub results: RefCell<VecDeque<Vec<Row>>>,
    /// When set, any statement containing this substring fails.
    pub fail_on: RefCell<Option<String>>,
}

impl FakeConnection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            log: RefCell::new(Vec::new()),
            tables: RefCell::new(BTreeSet::new()),
            records: RefCell::new(Vec::new()),
            next_insert_id: Cell::new(1),
            rows_affected: Cell::new(1),
            results: RefCell::new(VecDeque::new()),
            fail_on: RefCell::new(None),
        }
    }

    pub fn sqlite() -> Self {
        Self::new(Dialect::Sqlite)
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn last_statement(&self) -> (String, Vec<Value>) {
        self.log.borrow().last().cloned().expect("no statements executed")
    }

    pub fn queue_result(&self, rows: Vec<Row>) {
        self.results.borrow_mut().push_back(rows);
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.borrow().contains(name)
    }

    fn check_fail(&self, sql: &str) -> OrmResult<()> {
        if let Some(needle) = self.fail_on.borrow().as_ref() {
            if sql.contains(needle) {
                return Err(OrmError::execution(sql.to_string(), "injected failure"));
            }
        }
        Ok(())
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.log.borrow_mut().push((sql.to_string(), params.to_vec()));
    }

    fn table_after<'a>(sql: &'a str, prefix: &str) -> Option<&'a str> {
        sql.strip_prefix(prefix)
            .map(|rest| rest.split_whitespace().next().unwrap_or(""))
            .map(|name| name.trim_end_matches('('))
    }
}

impl Connection for FakeConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.record(sql, params);
        self.check_fail(sql)?;

        if let Some(name) = Self::table_after(sql, "CREATE TABLE ") {
            self.tables.borrow_mut().insert(name.to_string());
            return Ok(0);
        }
        if let Some(name) = Self::table_after(sql, "DROP TABLE IF EXISTS ")
            .or_else(|| Self::table_after(sql, "DROP TABLE "))
        {
            self.tables.borrow_mut().remove(name);
            return Ok(0);
        }
        // Bookkeeping writes, whatever the migrator's table is named.
        if sql.starts_with("INSERT INTO ") && sql.contains("(name, batch)") {
            let name = params[0].as_str().unwrap_or_default().to_string();
            let batch = params[1].as_int().unwrap_or_default();
            self.records.borrow_mut().push((name, batch));
            return Ok(1);
        }
        if sql.starts_with("DELETE FROM ") && sql.ends_with("WHERE name = ?") {
            let name = params[0].as_str().unwrap_or_default();
            self.records.borrow_mut().retain(|(n, _)| n != name);
            return Ok(1);
        }

        Ok(self.rows_affected.get())
    }

    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<i64> {
        self.record(sql, params);
        self.check_fail(sql)?;
        let id = self.next_insert_id.get();
        self.next_insert_id.set(id + 1);
        Ok(id)
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.record(sql, params);
        self.check_fail(sql)?;

        if sql.starts_with("SELECT name, batch FROM ") {
            return Ok(self
                .records
                .borrow()
                .iter()
                .map(|(name, batch)| {
                    Row::new(
                        vec!["name".into(), "batch".into()],
                        vec![Value::Text(name.clone()), Value::Int(*batch)],
                    )
                })
                .collect());
        }

        // Table existence probes from Schema::has_table.
        if sql.contains("sqlite_master")
            || sql.contains("information_schema.tables")
            || sql.contains("pg_tables")
        {
            let name = params[0].as_str().unwrap_or_default();
            if self.has_table(name) {
                return Ok(vec![Row::new(
                    vec!["name".into()],
                    vec![Value::Text(name.to_string())],
                )]);
            }
            return Ok(Vec::new());
        }

        Ok(self.results.borrow_mut().pop_front().unwrap_or_default())
    }
}
