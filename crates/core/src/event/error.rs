//! Event error types.

use herkey_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Event operation errors.
#[derive(Debug, Error)]
pub enum EventError {
    /// Event not found.
    #[error("event not found: {0}")]
    NotFound(Uuid),

    /// A field failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl EventError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(_) => Self::NotFound(err.to_string()),
            EventError::Validation { .. } => Self::Validation(err.to_string()),
            EventError::Repository(msg) => Self::Database(msg),
        }
    }
}
