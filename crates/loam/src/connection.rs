//! The external connection boundary.
//!
//! The persistence core does not open sockets or speak wire protocols; it
//! renders SQL with `?` placeholders plus a flat parameter list and hands both
//! to a [`Connection`], which the surrounding framework obtains from its
//! container (typically a pooled driver handle). The trait is object-safe so
//! builders, the lifecycle engine, and the migrator can all share one
//! `&dyn Connection`.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};

/// SQL dialect family of the underlying driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One result row: driver column metadata plus decoded values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Raw value by position.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Typed value by column name.
    ///
    /// A missing column is an [`OrmError::InvalidDestination`]; a type
    /// mismatch is an [`OrmError::Decode`].
    pub fn try_get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self.get(column).ok_or_else(|| {
            OrmError::invalid_destination(column, "column not present in result")
        })?;
        T::from_value(value.clone()).map_err(|message| OrmError::decode(column, message))
    }

    /// Typed value by position.
    pub fn try_get_at<T: FromValue>(&self, index: usize) -> OrmResult<T> {
        let value = self.value_at(index).ok_or_else(|| {
            OrmError::invalid_destination(index.to_string(), "column index out of range")
        })?;
        T::from_value(value.clone())
            .map_err(|message| OrmError::decode(self.columns[index].clone(), message))
    }
}

/// A live database handle.
///
/// Implementations are presumed safe for concurrent use (pooled); everything
/// built on top of them here is synchronous and blocking. Cancellation and
/// timeouts are whatever the driver provides.
pub trait Connection {
    /// Dialect family of this handle.
    fn dialect(&self) -> Dialect;

    /// Execute a statement, returning the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// Execute an INSERT, returning the generated identifier where the
    /// driver supports it (0 otherwise).
    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<i64>;

    /// Execute a query, returning all result rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;
}
