//! Error types for loam

use thiserror::Error;

/// Result type alias for loam operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for persistence operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// The scan destination cannot receive the result shape
    #[error("Invalid destination for column '{column}': {message}")]
    InvalidDestination { column: String, message: String },

    /// An UPDATE/DELETE keyed by a known identifier matched zero rows
    #[error("No rows affected on '{table}' for id {id}")]
    NoRowsAffected { table: String, id: i64 },

    /// Driver/connection failure, passed through with statement context
    #[error("Execution error on {context}: {message}")]
    Execution { context: String, message: String },

    /// A lifecycle listener returned an error, halting the operation
    #[error("Event '{event}' aborted on '{entity}': {message}")]
    EventAborted {
        event: &'static str,
        entity: String,
        message: String,
    },

    /// Operation not supported for this entity or state
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-destination error for a specific column
    pub fn invalid_destination(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDestination {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an execution error carrying statement context
    pub fn execution(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Check if this is a no-rows-affected error
    pub fn is_no_rows_affected(&self) -> bool {
        matches!(self, Self::NoRowsAffected { .. })
    }

    /// Check if this is an aborted-event error
    pub fn is_event_aborted(&self) -> bool {
        matches!(self, Self::EventAborted { .. })
    }
}
