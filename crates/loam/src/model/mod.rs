//! Change-tracked entity contract.
//!
//! A persisted entity is a struct deriving `Model`, embedding a [`BaseModel`]
//! that carries the identifier, timestamp columns, and change-tracking state.
//! Field↔column bindings are generated once per type by the derive macro (no
//! per-row introspection); embedded sub-structures' bindings are flattened
//! into the owner's column namespace, owner winning on collisions.
//!
//! Dirty state is computed by diffing current field values against the
//! `original` snapshot taken at the last successful load or write, so the
//! invariants hold by construction: the dirty set is empty right after a
//! create or update, and `exists` is true iff the entity has been inserted
//! and not force-deleted.

mod lifecycle;

#[cfg(test)]
mod tests;

pub use lifecycle::ModelOps;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::builder::QueryBuilder;
use crate::connection::{Connection, Row};
use crate::error::{OrmError, OrmResult};
use crate::row::FromRow;
use crate::value::{FromValue, ToValue, Value};

/// String-keyed access to a struct's mapped columns.
///
/// Derived for entities and embeddable sub-structures. Lookups resolve the
/// owner's own fields before flattened embeds.
pub trait FieldSet {
    /// Flattened column names, in declaration order.
    fn columns() -> Vec<&'static str>
    where
        Self: Sized;

    /// Read one mapped field as a [`Value`]; `None` if the column is unmapped.
    fn get_field(&self, column: &str) -> Option<Value>;

    /// Write one mapped field from a [`Value`].
    ///
    /// Returns `Ok(false)` for unmapped columns (the caller discards them)
    /// and a decode error when the value does not fit the field.
    fn set_field(&mut self, column: &str, value: Value) -> OrmResult<bool>;
}

/// Shared persisted state embedded by every entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseModel {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub(crate) original: BTreeMap<String, Value>,
    pub(crate) exists: bool,
}

impl FieldSet for BaseModel {
    fn columns() -> Vec<&'static str> {
        vec!["id", "created_at", "updated_at", "deleted_at"]
    }

    fn get_field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Int(self.id)),
            "created_at" => Some(self.created_at.to_value()),
            "updated_at" => Some(self.updated_at.to_value()),
            "deleted_at" => Some(self.deleted_at.to_value()),
            _ => None,
        }
    }

    fn set_field(&mut self, column: &str, value: Value) -> OrmResult<bool> {
        match column {
            "id" => {
                self.id = FromValue::from_value(value)
                    .map_err(|m| OrmError::decode(column, m))?;
            }
            "created_at" => {
                self.created_at = FromValue::from_value(value)
                    .map_err(|m| OrmError::decode(column, m))?;
            }
            "updated_at" => {
                self.updated_at = FromValue::from_value(value)
                    .map_err(|m| OrmError::decode(column, m))?;
            }
            "deleted_at" => {
                self.deleted_at = FromValue::from_value(value)
                    .map_err(|m| OrmError::decode(column, m))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A persisted entity: field bindings plus the embedded [`BaseModel`].
///
/// Derive with `#[derive(Model)]`, which also generates the [`FromRow`]
/// impl (delegating to [`Model::hydrate`]); lifecycle operations come from
/// the blanket [`ModelOps`] impl.
pub trait Model: FieldSet + Default + FromRow {
    /// Table this entity persists to.
    fn table() -> &'static str
    where
        Self: Sized;

    fn base(&self) -> &BaseModel;

    fn base_mut(&mut self) -> &mut BaseModel;

    /// A builder scoped to this entity's table.
    fn query() -> QueryBuilder
    where
        Self: Sized,
    {
        QueryBuilder::table(Self::table())
    }

    /// Look up one entity by identifier.
    fn find(conn: &dyn Connection, id: i64) -> OrmResult<Option<Self>>
    where
        Self: Sized,
    {
        Self::query().where_("id", "=", id).first(conn)
    }

    fn id(&self) -> i64 {
        self.base().id
    }

    /// Whether this entity has been inserted and not force-deleted.
    fn exists(&self) -> bool {
        self.base().exists
    }

    /// Columns whose current value differs from the last persisted one,
    /// primary key excluded, in declaration order.
    fn dirty(&self) -> Vec<(&'static str, Value)>
    where
        Self: Sized,
    {
        let original = &self.base().original;
        Self::columns()
            .into_iter()
            .filter(|column| *column != "id")
            .filter_map(|column| {
                let current = self.get_field(column).unwrap_or(Value::Null);
                let known = original.get(column).cloned().unwrap_or(Value::Null);
                (current != known).then_some((column, current))
            })
            .collect()
    }

    fn is_dirty(&self) -> bool
    where
        Self: Sized,
    {
        !self.dirty().is_empty()
    }

    /// Snapshot current field values as the last known persisted state.
    fn sync_original(&mut self)
    where
        Self: Sized,
    {
        let snapshot: BTreeMap<String, Value> = Self::columns()
            .into_iter()
            .map(|column| {
                let value = self.get_field(column).unwrap_or(Value::Null);
                (column.to_string(), value)
            })
            .collect();
        self.base_mut().original = snapshot;
    }

    /// Hydration: map result columns through the entity's bindings, discard
    /// unmapped columns, mark the entity existing, and sync its original
    /// values. The derived [`FromRow`] impl delegates here.
    fn hydrate(row: &Row) -> OrmResult<Self>
    where
        Self: Sized,
    {
        let mut model = Self::default();
        for (i, column) in row.columns().iter().enumerate() {
            if let Some(value) = row.value_at(i) {
                model.set_field(column, value.clone())?;
            }
        }
        model.base_mut().exists = true;
        model.sync_original();
        Ok(model)
    }
}
