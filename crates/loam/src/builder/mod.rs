//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates one logical statement through chained calls
//! and renders it once; start a fresh chain per query. SQL is rendered with
//! `?` placeholders and a flat ordered parameter list; placeholder
//! substitution belongs to the driver binding.
//!
//! ```ignore
//! let users: Vec<User> = QueryBuilder::table("users")
//!     .where_("status", "=", "active")
//!     .order_by("created_at DESC")
//!     .limit(10)
//!     .get(&conn)?;
//! ```
//!
//! Soft-deleted rows are excluded by default; see [`QueryBuilder::with_trashed`]
//! and [`QueryBuilder::only_trashed`].

mod predicate;


use chrono::{DateTime, Utc};

use crate::connection::Connection;
use crate::error::OrmResult;
use crate::row::FromRow;
use crate::value::{ToValue, Value};

use predicate::{Connective, Predicate};

/// Soft-delete visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trashed {
    /// Default: inject `deleted_at IS NULL` once.
    Exclude,
    /// Include soft-deleted rows.
    With,
    /// Only soft-deleted rows: inject `deleted_at IS NOT NULL`.
    Only,
}

/// Fluent specification of a SELECT/INSERT/UPDATE/DELETE statement.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    columns: Vec<String>,
    predicates: Vec<Predicate>,
    joins: Vec<String>,
    group_columns: Vec<String>,
    having: Vec<Predicate>,
    orders: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    trashed: Trashed,
}

impl QueryBuilder {
    /// Start a builder for a table.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            predicates: Vec::new(),
            joins: Vec::new(),
            group_columns: Vec::new(),
            having: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            trashed: Trashed::Exclude,
        }
    }

    // ==================== Projection ====================

    /// Set SELECT columns, replacing the default `*`.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    // ==================== Predicates ====================

    /// Add `column <op> value` joined with AND.
    pub fn where_(mut self, column: &str, op: &str, value: impl ToValue) -> Self {
        self.predicates
            .push(Predicate::compare(column, op, value.to_value(), Connective::And));
        self
    }

    /// Add `column <op> value` joined with OR.
    pub fn or_where(mut self, column: &str, op: &str, value: impl ToValue) -> Self {
        self.predicates
            .push(Predicate::compare(column, op, value.to_value(), Connective::Or));
        self
    }

    /// Add `column IN (values...)`. An empty list matches nothing.
    pub fn where_in(mut self, column: &str, values: Vec<impl ToValue>) -> Self {
        let values = values.iter().map(ToValue::to_value).collect();
        self.predicates
            .push(Predicate::in_list(column, values, Connective::And));
        self
    }

    /// Add `column IS NULL`.
    pub fn where_null(mut self, column: &str) -> Self {
        self.predicates
            .push(Predicate::null(column, false, Connective::And));
        self
    }

    /// Add `column IS NOT NULL`.
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.predicates
            .push(Predicate::null(column, true, Connective::And));
        self
    }

    /// Add a raw WHERE expression rendered verbatim, with `?` placeholders
    /// for the given values.
    ///
    /// # Safety
    ///
    /// The expression is concatenated into the statement; the caller must
    /// keep untrusted input in the bound values.
    pub fn where_raw(mut self, expr: &str, values: Vec<Value>) -> Self {
        self.predicates
            .push(Predicate::raw(expr, values, Connective::And));
        self
    }

    // ==================== Soft-delete scope ====================

    /// Include soft-deleted rows.
    pub fn with_trashed(mut self) -> Self {
        self.trashed = Trashed::With;
        self
    }

    /// Only soft-deleted rows.
    pub fn only_trashed(mut self) -> Self {
        self.trashed = Trashed::Only;
        self
    }

    // ==================== Joins ====================

    /// Add `INNER JOIN table ON on`.
    pub fn join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("INNER JOIN {} ON {}", table, on));
        self
    }

    /// Add `LEFT JOIN table ON on`.
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("LEFT JOIN {} ON {}", table, on));
        self
    }

    /// Add a raw join fragment.
    pub fn join_raw(mut self, fragment: &str) -> Self {
        self.joins.push(fragment.to_string());
        self
    }

    // ==================== Grouping ====================

    /// Add a GROUP BY column.
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_columns.push(column.to_string());
        self
    }

    /// Add a HAVING predicate.
    pub fn having(mut self, column: &str, op: &str, value: impl ToValue) -> Self {
        self.having
            .push(Predicate::compare(column, op, value.to_value(), Connective::And));
        self
    }

    // ==================== Ordering & pagination ====================

    /// Add an ORDER BY fragment (e.g. `"created_at DESC"`).
    pub fn order_by(mut self, fragment: &str) -> Self {
        self.orders.push(fragment.to_string());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Rendering ====================

    /// Effective predicate list with the soft-delete scope applied.
    ///
    /// The default filter is injected exactly once: an existing predicate on
    /// `deleted_at` suppresses it.
    fn scoped_predicates(&self, scope: Trashed) -> Vec<Predicate> {
        let mut predicates = self.predicates.clone();
        let already_scoped = predicates.iter().any(|p| p.references("deleted_at"));
        match scope {
            Trashed::Exclude if !already_scoped => {
                predicates.push(Predicate::null("deleted_at", false, Connective::And));
            }
            Trashed::Only if !already_scoped => {
                predicates.push(Predicate::null("deleted_at", true, Connective::And));
            }
            _ => {}
        }
        predicates
    }

    fn push_where(&self, scope: Trashed, sql: &mut String, params: &mut Vec<Value>) {
        let predicates = self.scoped_predicates(scope);
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            predicate::render(&predicates, sql, params);
        }
    }

    /// Render the SELECT statement and its bound parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.select_sql(self.limit)
    }

    fn select_sql(&self, limit: Option<i64>) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        let mut params = Vec::new();

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        self.push_where(self.trashed, &mut sql, &mut params);

        if !self.group_columns.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_columns.join(", "));
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            predicate::render(&self.having, &mut sql, &mut params);
        }

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    pub(crate) fn insert_sql(&self, fields: &[(&str, Value)]) -> (String, Vec<Value>) {
        let columns: Vec<&str> = fields.iter().map(|(c, _)| *c).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders
        );
        let params = fields.iter().map(|(_, v)| v.clone()).collect();
        (sql, params)
    }

    pub(crate) fn update_sql(
        &self,
        fields: &[(&str, Value)],
        scope: Option<Trashed>,
    ) -> (String, Vec<Value>) {
        let assignments: Vec<String> = fields.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        let mut params: Vec<Value> = fields.iter().map(|(_, v)| v.clone()).collect();
        self.push_where(scope.unwrap_or(self.trashed), &mut sql, &mut params);
        (sql, params)
    }

    pub(crate) fn delete_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        self.push_where(self.trashed, &mut sql, &mut params);
        (sql, params)
    }

    // ==================== Execution ====================

    /// Fetch all matching rows mapped into `T`.
    pub fn get<T: FromRow>(&self, conn: &dyn Connection) -> OrmResult<Vec<T>> {
        let (sql, params) = self.to_sql();
        self.trace(conn, &sql);
        let rows = conn.query(&sql, &params)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Fetch the first matching row, if any.
    pub fn first<T: FromRow>(&self, conn: &dyn Connection) -> OrmResult<Option<T>> {
        let (sql, params) = self.select_sql(Some(1));
        self.trace(conn, &sql);
        let rows = conn.query(&sql, &params)?;
        rows.first().map(T::from_row).transpose()
    }

    /// Count matching rows.
    pub fn count(&self, conn: &dyn Connection) -> OrmResult<i64> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let mut params = Vec::new();
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        self.push_where(self.trashed, &mut sql, &mut params);
        self.trace(conn, &sql);
        let rows = conn.query(&sql, &params)?;
        match rows.first() {
            Some(row) => row.try_get_at(0),
            None => Ok(0),
        }
    }

    /// Whether any row matches.
    pub fn exists(&self, conn: &dyn Connection) -> OrmResult<bool> {
        Ok(self.count(conn)? > 0)
    }

    /// Fetch a single column from all matching rows.
    pub fn pluck(&self, conn: &dyn Connection, column: &str) -> OrmResult<Vec<Value>> {
        let plucked = self.clone().select(&[column]);
        let (sql, params) = plucked.to_sql();
        self.trace(conn, &sql);
        let rows = conn.query(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.value_at(0).cloned())
            .collect())
    }

    /// Insert a row, returning the generated identifier where supported.
    pub fn insert(&self, conn: &dyn Connection, fields: &[(&str, Value)]) -> OrmResult<i64> {
        let (sql, params) = self.insert_sql(fields);
        self.trace(conn, &sql);
        conn.insert(&sql, &params)
    }

    /// Update matching rows, returning the number affected.
    pub fn update(&self, conn: &dyn Connection, fields: &[(&str, Value)]) -> OrmResult<u64> {
        let (sql, params) = self.update_sql(fields, None);
        self.trace(conn, &sql);
        conn.execute(&sql, &params)
    }

    /// Soft-delete matching rows: stamp `deleted_at` and `updated_at`.
    pub fn delete(&self, conn: &dyn Connection) -> OrmResult<u64> {
        let now = Value::DateTime(Utc::now());
        self.update(
            conn,
            &[("deleted_at", now.clone()), ("updated_at", now)],
        )
    }

    /// Hard-delete matching rows with a true DELETE.
    pub fn force_delete(&self, conn: &dyn Connection) -> OrmResult<u64> {
        let (sql, params) = self.delete_sql();
        self.trace(conn, &sql);
        conn.execute(&sql, &params)
    }

    /// Clear `deleted_at` on matching rows, including trashed ones.
    pub fn restore(&self, conn: &dyn Connection) -> OrmResult<u64> {
        self.restore_at(conn, Utc::now())
    }

    /// `restore` with a caller-supplied stamp, so the lifecycle engine can
    /// write the same instant it keeps in memory.
    pub(crate) fn restore_at(&self, conn: &dyn Connection, now: DateTime<Utc>) -> OrmResult<u64> {
        let fields = [
            ("deleted_at", Value::Null),
            ("updated_at", Value::DateTime(now)),
        ];
        let (sql, params) = self.update_sql(&fields, Some(Trashed::With));
        self.trace(conn, &sql);
        conn.execute(&sql, &params)
    }

    fn trace(&self, conn: &dyn Connection, sql: &str) {
        tracing::debug!(
            table = %self.table,
            dialect = %conn.dialect(),
            sql,
            "executing statement"
        );
    }
}
