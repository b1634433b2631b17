//! Attachment types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::PresignedUrl;

/// Maximum length of the cloud key and display name.
pub const ATTACHMENT_FIELD_MAX_LEN: usize = 100;

/// What an attachment is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentType {
    /// Header image; at most one per event.
    Banner,
    /// Any other image.
    #[default]
    EventImage,
}

impl AttachmentType {
    /// Wire/database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "BANNER",
            Self::EventImage => "EVENT_IMAGE",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BANNER" => Some(Self::Banner),
            "EVENT_IMAGE" => Some(Self::EventImage),
            _ => None,
        }
    }
}

/// Attachment domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Unique identifier (UUID v7).
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Object key in the bucket.
    pub attachment_cloud_id: Option<String>,
    /// Display name.
    pub attachment_name: Option<String>,
    /// Usage.
    pub attachment_type: AttachmentType,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified: DateTime<Utc>,
}

impl Attachment {
    /// Builds a new active attachment.
    #[must_use]
    pub fn new(input: CreateAttachmentInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_id: input.event_id,
            attachment_cloud_id: input.attachment_cloud_id,
            attachment_name: input.attachment_name,
            attachment_type: input.attachment_type,
            active: true,
            created: now,
            modified: now,
        }
    }
}

/// Input for creating an attachment.
#[derive(Debug, Clone)]
pub struct CreateAttachmentInput {
    /// Owning event.
    pub event_id: Uuid,
    /// Object key returned by the upload target.
    pub attachment_cloud_id: Option<String>,
    /// Display name.
    pub attachment_name: Option<String>,
    /// Usage.
    pub attachment_type: AttachmentType,
}

/// Where and how a client should upload a new file.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTarget {
    /// Presigned upload request.
    pub signed_url: PresignedUrl,
    /// Key to store on the attachment once uploaded.
    pub cloud_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_type_strings() {
        assert_eq!(AttachmentType::Banner.as_str(), "BANNER");
        assert_eq!(
            AttachmentType::parse("EVENT_IMAGE"),
            Some(AttachmentType::EventImage)
        );
        assert_eq!(AttachmentType::parse("LOGO"), None);
        assert_eq!(AttachmentType::default(), AttachmentType::EventImage);
    }
}
