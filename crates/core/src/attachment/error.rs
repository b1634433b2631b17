//! Attachment error types.

use herkey_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment not found.
    #[error("attachment not found: {0}")]
    NotFound(Uuid),

    /// Referenced event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// The event already has a banner.
    #[error("event {0} already has a banner")]
    BannerExists(Uuid),

    /// A field failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No object storage is configured.
    #[error("object storage is not configured")]
    StorageNotConfigured,

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
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

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::NotFound(_) | AttachmentError::EventNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            AttachmentError::BannerExists(_) => Self::Conflict(err.to_string()),
            AttachmentError::Validation { .. } => Self::Validation(err.to_string()),
            AttachmentError::StorageNotConfigured | AttachmentError::Storage(_) => {
                Self::ExternalService(err.to_string())
            }
            AttachmentError::Repository(msg) => Self::Database(msg),
        }
    }
}
