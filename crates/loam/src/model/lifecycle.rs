//! Entity CRUD orchestration with lifecycle events.
//!
//! State machine: new → create → existing → update* → existing → soft delete
//! → soft-deleted → restore → existing; force delete from either persisted
//! state removes the row for good.
//!
//! None of these operations open a transaction: a create is an event chain
//! plus an INSERT plus an identifier fetch, and a failure partway through
//! leaves partially applied state. That gap is deliberate and documented,
//! not something this layer papers over.

use chrono::Utc;

use crate::connection::Connection;
use crate::error::{OrmError, OrmResult};
use crate::events::{Events, ModelEvent};
use crate::model::Model;
use crate::value::Value;

/// Lifecycle operations, blanket-implemented for every [`Model`].
pub trait ModelOps: Model + Sized {
    /// Insert or update depending on whether the entity exists.
    fn save(&mut self, conn: &dyn Connection, events: &Events<Self>) -> OrmResult<()> {
        if self.exists() {
            self.update(conn, events)
        } else {
            self.create(conn, events)
        }
    }

    /// Insert this entity and capture its generated identifier.
    ///
    /// Fires `saving` and `creating` before the INSERT (either may abort),
    /// then `created` and `saved`.
    fn create(&mut self, conn: &dyn Connection, events: &Events<Self>) -> OrmResult<()> {
        let now = Utc::now();
        self.base_mut().created_at = Some(now);
        self.base_mut().updated_at = Some(now);

        events.dispatch(ModelEvent::Saving, self, Self::table())?;
        events.dispatch(ModelEvent::Creating, self, Self::table())?;

        // All bound columns except the primary key; change-tracking state is
        // not a column and never reaches the statement.
        let fields: Vec<(&str, Value)> = Self::columns()
            .into_iter()
            .filter(|column| *column != "id")
            .map(|column| (column, self.get_field(column).unwrap_or(Value::Null)))
            .collect();

        let id = Self::query().insert(conn, &fields)?;
        if id != 0 {
            self.base_mut().id = id;
        }
        self.base_mut().exists = true;
        self.sync_original();

        events.dispatch(ModelEvent::Created, self, Self::table())?;
        events.dispatch(ModelEvent::Saved, self, Self::table())?;
        Ok(())
    }

    /// Write dirty columns back, keyed by identifier.
    ///
    /// Returns without I/O when nothing is dirty. Fails with
    /// [`OrmError::NoRowsAffected`] when the identifier matches no row
    /// (known but stale, as opposed to not found).
    fn update(&mut self, conn: &dyn Connection, events: &Events<Self>) -> OrmResult<()> {
        if !self.is_dirty() {
            return Ok(());
        }
        self.base_mut().updated_at = Some(Utc::now());

        events.dispatch(ModelEvent::Saving, self, Self::table())?;
        events.dispatch(ModelEvent::Updating, self, Self::table())?;

        // Collected after stamping and events so listener mutations are written.
        let dirty = self.dirty();
        let affected = Self::query()
            .where_("id", "=", self.id())
            .with_trashed()
            .update(conn, &dirty)?;
        if affected == 0 {
            return Err(OrmError::NoRowsAffected {
                table: Self::table().to_string(),
                id: self.id(),
            });
        }
        self.sync_original();

        events.dispatch(ModelEvent::Updated, self, Self::table())?;
        events.dispatch(ModelEvent::Saved, self, Self::table())?;
        Ok(())
    }

    /// Soft-delete: stamp `deleted_at` and mark the entity gone.
    fn delete(&mut self, conn: &dyn Connection, events: &Events<Self>) -> OrmResult<()> {
        self.require_id("delete")?;
        events.dispatch(ModelEvent::Deleting, self, Self::table())?;

        let now = Utc::now();
        self.base_mut().deleted_at = Some(now);
        self.base_mut().updated_at = Some(now);
        let fields = [
            ("deleted_at", Value::DateTime(now)),
            ("updated_at", Value::DateTime(now)),
        ];
        let affected = Self::query()
            .where_("id", "=", self.id())
            .with_trashed()
            .update(conn, &fields)?;
        if affected == 0 {
            return Err(OrmError::NoRowsAffected {
                table: Self::table().to_string(),
                id: self.id(),
            });
        }
        self.base_mut().exists = false;
        self.sync_original();

        events.dispatch(ModelEvent::Deleted, self, Self::table())?;
        Ok(())
    }

    /// Hard-delete with a true DELETE statement, same event pair as `delete`.
    fn force_delete(&mut self, conn: &dyn Connection, events: &Events<Self>) -> OrmResult<()> {
        self.require_id("force delete")?;
        events.dispatch(ModelEvent::Deleting, self, Self::table())?;

        let affected = Self::query()
            .where_("id", "=", self.id())
            .with_trashed()
            .force_delete(conn)?;
        if affected == 0 {
            return Err(OrmError::NoRowsAffected {
                table: Self::table().to_string(),
                id: self.id(),
            });
        }
        self.base_mut().exists = false;
        self.sync_original();

        events.dispatch(ModelEvent::Deleted, self, Self::table())?;
        Ok(())
    }

    /// Clear `deleted_at` and mark the entity existing again.
    ///
    /// Fires no lifecycle events; the asymmetry with `delete` is deliberate
    /// and pinned by tests.
    fn restore(&mut self, conn: &dyn Connection) -> OrmResult<()> {
        self.require_id("restore")?;
        let now = Utc::now();
        self.base_mut().deleted_at = None;
        self.base_mut().updated_at = Some(now);

        Self::query()
            .where_("id", "=", self.id())
            .restore_at(conn, now)?;
        self.base_mut().exists = true;
        self.sync_original();
        Ok(())
    }

    /// Reload this entity from storage, trashed rows included.
    fn fresh(&self, conn: &dyn Connection) -> OrmResult<Option<Self>> {
        Self::query()
            .with_trashed()
            .where_("id", "=", self.id())
            .first(conn)
    }

    #[doc(hidden)]
    fn require_id(&self, operation: &str) -> OrmResult<()> {
        if self.id() == 0 {
            return Err(OrmError::Unsupported(format!(
                "cannot {} '{}' without a persisted identifier",
                operation,
                Self::table()
            )));
        }
        Ok(())
    }
}

impl<T: Model> ModelOps for T {}
