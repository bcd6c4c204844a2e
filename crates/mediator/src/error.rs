//! Mediator error types.

use std::time::Duration;

use domain::OrderError;
use order_store::StorageError;
use thiserror::Error;

/// Terminal failures completed on a caller's response.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// The request was malformed or missing a required field.
    #[error("Validation failed: {0}")]
    Validation(#[from] OrderError),

    /// The store reported an error while saving the order.
    #[error("Persistence failed: {0}")]
    Storage(#[from] StorageError),

    /// The store did not answer within the configured bound.
    #[error("Persistence timed out after {}ms", .limit.as_millis())]
    Timeout { limit: Duration },

    /// Anything outside the explicit failure paths.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediatorError {
    /// Stable name of the error class, used on the wire and as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            MediatorError::Validation(_) => "validation",
            MediatorError::Storage(_) => "storage",
            MediatorError::Timeout { .. } => "timeout",
            MediatorError::Internal(_) => "internal",
        }
    }
}

/// Errors returned by a response sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink was already completed; the new outcome was discarded.
    #[error("Response already completed")]
    AlreadyCompleted,
}
