//! Schema definition and execution.
//!
//! A [`Blueprint`] closure declares columns and constraints; [`Schema`]
//! renders it through the connection's dialect grammar and executes the
//! resulting statements in order, stopping at the first failure.
//!
//! ```no_run
//! # use loam::{Schema, Connection, OrmResult};
//! # fn demo(conn: &dyn Connection) -> OrmResult<()> {
//! Schema::create(conn, "users", |t| {
//!     t.id();
//!     t.string("email", 255).unique();
//!     t.timestamps();
//!     t.soft_deletes();
//! })?;
//! # Ok(())
//! # }
//! ```

mod column;
mod grammar;
mod table;

#[cfg(test)]
mod tests;

pub use column::{ColumnDef, ColumnType};
pub use table::{Blueprint, ForeignKey, IndexDef};

use tracing::debug;

use crate::connection::{Connection, Dialect};
use crate::error::OrmResult;
use crate::value::Value;

/// Entry points for DDL, mirroring the builder's execution style.
pub struct Schema;

impl Schema {
    /// Create a table from a blueprint closure.
    pub fn create(
        conn: &dyn Connection,
        table: &str,
        build: impl FnOnce(&mut Blueprint),
    ) -> OrmResult<()> {
        let mut blueprint = Blueprint::create(table);
        build(&mut blueprint);
        Self::run(conn, &blueprint)
    }

    /// Alter an existing table: added columns, indexes, and foreign keys.
    pub fn table(
        conn: &dyn Connection,
        table: &str,
        build: impl FnOnce(&mut Blueprint),
    ) -> OrmResult<()> {
        let mut blueprint = Blueprint::alter(table);
        build(&mut blueprint);
        Self::run(conn, &blueprint)
    }

    pub fn drop(conn: &dyn Connection, table: &str) -> OrmResult<()> {
        conn.execute(&format!("DROP TABLE {}", table), &[])?;
        Ok(())
    }

    pub fn drop_if_exists(conn: &dyn Connection, table: &str) -> OrmResult<()> {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table), &[])?;
        Ok(())
    }

    /// `ALTER TABLE .. RENAME TO ..`, valid across all three dialects.
    pub fn rename(conn: &dyn Connection, from: &str, to: &str) -> OrmResult<()> {
        conn.execute(&format!("ALTER TABLE {} RENAME TO {}", from, to), &[])?;
        Ok(())
    }

    /// Probe the dialect's catalog for a table.
    pub fn has_table(conn: &dyn Connection, table: &str) -> OrmResult<bool> {
        let sql = match conn.dialect() {
            Dialect::Mysql => {
                "SELECT table_name FROM information_schema.tables WHERE table_name = ?"
            }
            Dialect::Postgres => {
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public' AND tablename = ?"
            }
            Dialect::Sqlite => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?"
            }
        };
        let rows = conn.query(sql, &[Value::Text(table.to_string())])?;
        Ok(!rows.is_empty())
    }

    fn run(conn: &dyn Connection, blueprint: &Blueprint) -> OrmResult<()> {
        for sql in blueprint.build(conn.dialect()) {
            debug!(table = %blueprint.table, dialect = %conn.dialect(), %sql, "schema statement");
            conn.execute(&sql, &[])?;
        }
        Ok(())
    }
}
