//! Batch-based schema migrations.
//!
//! Applied migrations are recorded by name in a bookkeeping table together
//! with the batch number they ran in. `run` applies every pending migration
//! as one new batch; `rollback` reverts the most recent batches; `reset`
//! reverts everything. The bookkeeping table is created on demand through
//! the same schema DSL migrations themselves use.

use serde::Serialize;
use tracing::info;

use crate::connection::Connection;
use crate::error::{OrmError, OrmResult};
use crate::schema::Schema;
use crate::value::Value;

/// One reversible schema change.
///
/// Registration order is execution order; names must be unique and stable
/// because they key the bookkeeping table.
pub trait Migration {
    fn name(&self) -> &str;

    fn up(&self, conn: &dyn Connection) -> OrmResult<()>;

    fn down(&self, conn: &dyn Connection) -> OrmResult<()>;
}

/// Status line for one registered migration, as reported by
/// [`Migrator::status`].
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub ran: bool,
    pub batch: Option<i64>,
}

/// Orders and applies registered [`Migration`]s against one connection.
pub struct Migrator<'a> {
    conn: &'a dyn Connection,
    table: String,
    registry: Vec<Box<dyn Migration>>,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a dyn Connection) -> Self {
        Self {
            conn,
            table: "migrations".to_string(),
            registry: Vec::new(),
        }
    }

    /// Use a bookkeeping table other than `migrations`.
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn register(&mut self, migration: impl Migration + 'static) -> &mut Self {
        self.registry.push(Box::new(migration));
        self
    }

    /// Apply every pending migration, in registration order, as one batch.
    ///
    /// Fails fast: a failing migration is not recorded and later pending
    /// migrations do not run. Re-running afterwards resumes from the failed
    /// one. Returns the names applied.
    pub fn run(&self) -> OrmResult<Vec<String>> {
        self.ensure_table()?;
        let applied = self.applied()?;
        let batch = applied.iter().map(|(_, b)| *b).max().unwrap_or(0) + 1;

        let mut ran = Vec::new();
        for migration in &self.registry {
            let name = migration.name();
            if applied.iter().any(|(n, _)| n == name) {
                continue;
            }
            info!(migration = name, batch, "applying");
            migration.up(self.conn)?;
            self.conn.execute(
                &format!("INSERT INTO {} (name, batch) VALUES (?, ?)", self.table),
                &[Value::Text(name.to_string()), Value::Int(batch)],
            )?;
            ran.push(name.to_string());
        }
        Ok(ran)
    }

    /// Revert the `steps` most recent batches, newest batch first. Within a
    /// batch, migrations revert in reverse registration order.
    pub fn rollback(&self, steps: usize) -> OrmResult<Vec<String>> {
        self.ensure_table()?;
        let applied = self.applied()?;

        let mut batches: Vec<i64> = applied.iter().map(|(_, b)| *b).collect();
        batches.sort_unstable();
        batches.dedup();

        let mut reverted = Vec::new();
        for batch in batches.into_iter().rev().take(steps) {
            for migration in self.registry.iter().rev() {
                let name = migration.name();
                if !applied.iter().any(|(n, b)| n == name && *b == batch) {
                    continue;
                }
                info!(migration = name, batch, "reverting");
                migration.down(self.conn)?;
                self.conn.execute(
                    &format!("DELETE FROM {} WHERE name = ?", self.table),
                    &[Value::Text(name.to_string())],
                )?;
                reverted.push(name.to_string());
            }
        }
        Ok(reverted)
    }

    /// Revert every applied migration.
    pub fn reset(&self) -> OrmResult<Vec<String>> {
        self.rollback(usize::MAX)
    }

    /// Report each registered migration with its applied batch, if any, in
    /// registration order.
    pub fn status(&self) -> OrmResult<Vec<MigrationStatus>> {
        self.ensure_table()?;
        let applied = self.applied()?;
        Ok(self
            .registry
            .iter()
            .map(|migration| {
                let batch = applied
                    .iter()
                    .find(|(n, _)| n == migration.name())
                    .map(|(_, b)| *b);
                MigrationStatus {
                    name: migration.name().to_string(),
                    ran: batch.is_some(),
                    batch,
                }
            })
            .collect())
    }

    fn ensure_table(&self) -> OrmResult<()> {
        if Schema::has_table(self.conn, &self.table)? {
            return Ok(());
        }
        Schema::create(self.conn, &self.table, |t| {
            t.id();
            t.string("name", 255).unique();
            t.integer("batch");
        })
    }

    fn applied(&self) -> OrmResult<Vec<(String, i64)>> {
        let rows = self.conn.query(
            &format!("SELECT name, batch FROM {}", self.table),
            &[],
        )?;
        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let batch: i64 = row.try_get("batch")?;
                Ok((name, batch))
            })
            .collect::<OrmResult<Vec<_>>>()
            .map_err(|e| OrmError::migration(e.to_string()))
    }
}
