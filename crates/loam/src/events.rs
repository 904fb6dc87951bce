//! Lifecycle events and synchronous listener dispatch.
//!
//! Listeners run on the calling thread, in registration order. The first
//! listener error halts the remaining chain and aborts the surrounding CRUD
//! operation as [`OrmError::EventAborted`].

use crate::error::{OrmError, OrmResult};

/// Lifecycle stages dispatched by the entity engine.
///
/// `restore` intentionally fires no events; the asymmetry with `delete` is
/// deliberate and pinned by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    Saving,
    Creating,
    Created,
    Saved,
    Updating,
    Updated,
    Deleting,
    Deleted,
}

impl ModelEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelEvent::Saving => "saving",
            ModelEvent::Creating => "creating",
            ModelEvent::Created => "created",
            ModelEvent::Saved => "saved",
            ModelEvent::Updating => "updating",
            ModelEvent::Updated => "updated",
            ModelEvent::Deleting => "deleting",
            ModelEvent::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle listener for entities of type `T`.
///
/// Implemented for closures of shape `Fn(ModelEvent, &mut T) -> OrmResult<()>`.
pub trait Listener<T> {
    fn handle(&self, event: ModelEvent, model: &mut T) -> OrmResult<()>;
}

impl<T, F> Listener<T> for F
where
    F: Fn(ModelEvent, &mut T) -> OrmResult<()>,
{
    fn handle(&self, event: ModelEvent, model: &mut T) -> OrmResult<()> {
        self(event, model)
    }
}

/// Ordered listener registry for one entity type.
///
/// Constructed by the caller (usually wired up by the framework container)
/// and passed into lifecycle operations; `Events::default()` dispatches to
/// nobody.
pub struct Events<T> {
    listeners: Vec<(Option<ModelEvent>, Box<dyn Listener<T>>)>,
}

impl<T> Default for Events<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<T> Events<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event.
    pub fn on(&mut self, event: ModelEvent, listener: impl Listener<T> + 'static) -> &mut Self {
        self.listeners.push((Some(event), Box::new(listener)));
        self
    }

    /// Register a listener for every event.
    pub fn on_any(&mut self, listener: impl Listener<T> + 'static) -> &mut Self {
        self.listeners.push((None, Box::new(listener)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn dispatch(&self, event: ModelEvent, model: &mut T, entity: &str) -> OrmResult<()> {
        for (filter, listener) in &self.listeners {
            if filter.map_or(true, |f| f == event) {
                listener.handle(event, model).map_err(|err| {
                    tracing::debug!(entity, event = event.as_str(), "listener aborted operation");
                    OrmError::EventAborted {
                        event: event.as_str(),
                        entity: entity.to_string(),
                        message: err.to_string(),
                    }
                })?;
            }
        }
        Ok(())
    }
}
