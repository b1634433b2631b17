//! Attachment service implementation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::error::AttachmentError;
use super::types::{
    ATTACHMENT_FIELD_MAX_LEN, Attachment, AttachmentType, CreateAttachmentInput, UploadTarget,
};
use crate::storage::{PresignedUrl, StorageService, generate_storage_key};

/// Repository trait for attachment persistence.
///
/// `insert` must report a second banner for the same event as
/// `AttachmentError::BannerExists`, even when the pre-check raced.
pub trait AttachmentRepository: Send + Sync {
    /// Check if an event exists.
    fn event_exists(
        &self,
        event_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;

    /// Check if an event already has a banner.
    fn banner_exists(
        &self,
        event_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;

    /// Insert an attachment row.
    fn insert(
        &self,
        attachment: Attachment,
    ) -> impl std::future::Future<Output = Result<Attachment, AttachmentError>> + Send;

    /// Delete attachment by ID, returning whether a row was removed.
    fn delete(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;
}

/// Attachment service.
///
/// Storage is optional; without it attachment records still work but upload
/// targets and download URLs fail with `StorageNotConfigured`.
pub struct AttachmentService<R: AttachmentRepository> {
    repo: Arc<R>,
    storage: Option<Arc<StorageService>>,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(repo: Arc<R>, storage: Option<Arc<StorageService>>) -> Self {
        Self { repo, storage }
    }

    /// Record an attachment on an event.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a field is longer than 100 characters
    /// - the event does not exist
    /// - a banner is requested and the event already has one
    pub async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, AttachmentError> {
        check_length("attachment_cloud_id", input.attachment_cloud_id.as_deref())?;
        check_length("attachment_name", input.attachment_name.as_deref())?;

        if !self.repo.event_exists(input.event_id).await? {
            return Err(AttachmentError::EventNotFound(input.event_id));
        }

        if input.attachment_type == AttachmentType::Banner
            && self.repo.banner_exists(input.event_id).await?
        {
            return Err(AttachmentError::BannerExists(input.event_id));
        }

        self.repo.insert(Attachment::new(input, Utc::now())).await
    }

    /// Remove an attachment record. The stored object is left in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the attachment does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), AttachmentError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AttachmentError::NotFound(id))
        }
    }

    /// Presigned download URL for the attachment's object.
    ///
    /// Returns `Ok(None)` when the attachment has no cloud key.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is missing or presigning fails.
    pub async fn resolve_download_url(
        &self,
        attachment: &Attachment,
    ) -> Result<Option<PresignedUrl>, AttachmentError> {
        let Some(key) = attachment
            .attachment_cloud_id
            .as_deref()
            .filter(|k| !k.is_empty())
        else {
            return Ok(None);
        };

        let storage = self.storage()?;
        Ok(Some(storage.presign_download(key).await?))
    }

    /// Fresh cloud key and presigned upload request for `file_name`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or stem, or a storage error.
    pub async fn request_upload_target(
        &self,
        file_name: &str,
    ) -> Result<UploadTarget, AttachmentError> {
        if file_name.trim().is_empty() {
            return Err(AttachmentError::validation(
                "file_name",
                "This field may not be blank.",
            ));
        }
        let cloud_id = generate_storage_key(file_name).ok_or_else(|| {
            AttachmentError::validation("file_name", "File name has no name before its extension.")
        })?;

        let signed_url = self.storage()?.presign_upload(&cloud_id).await?;

        Ok(UploadTarget {
            signed_url,
            cloud_id,
        })
    }

    fn storage(&self) -> Result<&StorageService, AttachmentError> {
        self.storage
            .as_deref()
            .ok_or(AttachmentError::StorageNotConfigured)
    }
}

fn check_length(field: &'static str, value: Option<&str>) -> Result<(), AttachmentError> {
    match value {
        Some(v) if v.chars().count() > ATTACHMENT_FIELD_MAX_LEN => Err(AttachmentError::validation(
            field,
            format!("Ensure this field has no more than {ATTACHMENT_FIELD_MAX_LEN} characters."),
        )),
        _ => Ok(()),
    }
}
