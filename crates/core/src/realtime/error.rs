//! Realtime error types.

use herkey_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::participant::ParticipantError;

/// Realtime token errors.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Event not found.
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// Caller holds no participant row on the event.
    #[error("user {user_id} is not a participant of event {event_id}")]
    NotParticipant {
        /// Requested event.
        event_id: Uuid,
        /// Caller.
        user_id: i32,
    },

    /// Invalid token input.
    #[error("invalid token request: {0}")]
    Validation(String),

    /// Agora credentials are missing.
    #[error("realtime provider is not configured: {0}")]
    Configuration(String),

    /// HMAC signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<ParticipantError> for RealtimeError {
    fn from(err: ParticipantError) -> Self {
        match err {
            ParticipantError::EventNotFound(id) => Self::EventNotFound(id),
            other => Self::Repository(other.to_string()),
        }
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::EventNotFound(_) | RealtimeError::NotParticipant { .. } => {
                Self::NotFound(err.to_string())
            }
            RealtimeError::Validation(_) => Self::Validation(err.to_string()),
            RealtimeError::Configuration(_) => Self::ExternalService(err.to_string()),
            RealtimeError::Signing(_) => Self::Internal(err.to_string()),
            RealtimeError::Repository(msg) => Self::Database(msg),
        }
    }
}
