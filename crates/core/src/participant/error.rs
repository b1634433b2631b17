//! Participant error types.

use herkey_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Participant operation errors.
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// Participant not found.
    #[error("participant not found: {0}")]
    NotFound(Uuid),

    /// Referenced event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// Referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(i32),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ParticipantError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ParticipantError> for AppError {
    fn from(err: ParticipantError) -> Self {
        match err {
            ParticipantError::NotFound(_)
            | ParticipantError::EventNotFound(_)
            | ParticipantError::UserNotFound(_) => Self::NotFound(err.to_string()),
            ParticipantError::Repository(msg) => Self::Database(msg),
        }
    }
}
