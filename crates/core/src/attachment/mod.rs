//! Event attachments: banners and images stored in object storage.
//!
//! This module provides:
//! - Attachment records with the one-banner-per-event rule
//! - Upload targets (cloud key + presigned upload request)
//! - Download URL resolution for stored objects

mod error;
mod service;
mod types;

pub use error::AttachmentError;
pub use service::{AttachmentRepository, AttachmentService};
pub use types::{
    ATTACHMENT_FIELD_MAX_LEN, Attachment, AttachmentType, CreateAttachmentInput, UploadTarget,
};
