//! # loam
//!
//! A dialect-aware persistence layer: query building with soft-delete
//! scoping, change-tracked entities with lifecycle events, a schema DSL,
//! and batch migrations. Synchronous by design; drivers plug in behind the
//! [`Connection`] trait.
//!
//! ## Features
//!
//! - **SQL explicit**: every builder renders to a plain statement plus an
//!   ordered parameter list, inspectable via `to_sql()`
//! - **Type-safe mapping**: Row → Struct via the `FromRow` trait, derived
//!   for entities
//! - **Minimal magic**: traits and macros only for boilerplate reduction;
//!   dirty state is computed, never mutated by hand
//! - **Soft deletes by default**: reads exclude trashed rows unless asked,
//!   writes stamp `deleted_at` instead of deleting
//! - **Dialect aware**: MySQL, Postgres, and SQLite DDL from one blueprint
//!
//! ## Query builder
//!
//! ```ignore
//! use loam::QueryBuilder;
//!
//! let users: Vec<User> = QueryBuilder::table("users")
//!     .where_("status", "=", "active")
//!     .order_by("created_at DESC")
//!     .limit(10)
//!     .get(&conn)?;
//!
//! let archived = QueryBuilder::table("users")
//!     .only_trashed()
//!     .count(&conn)?;
//! ```
//!
//! ## Entities
//!
//! ```ignore
//! use loam::{BaseModel, Model, ModelOps, Events};
//!
//! #[derive(Debug, Clone, Default, Model)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(base)]
//!     base: BaseModel,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let mut user = User { name: "ada".into(), ..Default::default() };
//! user.save(&conn, &Events::default())?;
//! ```

pub mod builder;
pub mod connection;
pub mod error;
pub mod events;
pub mod migrate;
pub mod model;
pub mod row;
pub mod schema;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::QueryBuilder;
pub use connection::{Connection, Dialect, Row};
pub use error::{OrmError, OrmResult};
pub use events::{Events, Listener, ModelEvent};
pub use migrate::{Migration, MigrationStatus, Migrator};
pub use model::{BaseModel, FieldSet, Model, ModelOps};
pub use row::FromRow;
pub use schema::{Blueprint, ColumnDef, ColumnType, ForeignKey, IndexDef, Schema};
pub use value::{FromValue, ToValue, Value};

#[cfg(feature = "derive")]
pub use loam_derive::{Embed, FromRow, Model};
