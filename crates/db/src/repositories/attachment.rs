//! Attachment repository for database operations.

use chrono::Utc;
use herkey_core::attachment::{
    Attachment, AttachmentError, AttachmentRepository as AttachmentRepoTrait, AttachmentType,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{
    event_attachments, events, sea_orm_active_enums::AttachmentType as DbAttachmentType,
};

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttachmentRepoTrait for AttachmentRepository {
    async fn event_exists(&self, event_id: Uuid) -> Result<bool, AttachmentError> {
        let count = events::Entity::find_by_id(event_id)
            .count(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn banner_exists(&self, event_id: Uuid) -> Result<bool, AttachmentError> {
        let count = event_attachments::Entity::find()
            .filter(event_attachments::Column::EventId.eq(event_id))
            .filter(event_attachments::Column::AttachmentType.eq(DbAttachmentType::Banner))
            .count(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn insert(&self, attachment: Attachment) -> Result<Attachment, AttachmentError> {
        let event_id = attachment.event_id;
        let active_model = event_attachments::ActiveModel {
            id: Set(attachment.id),
            event_id: Set(attachment.event_id),
            attachment_cloud_id: Set(attachment.attachment_cloud_id),
            attachment_name: Set(attachment.attachment_name),
            attachment_type: Set(to_db_attachment_type(attachment.attachment_type)),
            active: Set(attachment.active),
            created: Set(attachment.created.into()),
            modified: Set(attachment.modified.into()),
        };

        // unique_event_banner catches a banner inserted between check and insert
        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                warn!(%event_id, "Banner insert rejected by unique index");
                AttachmentError::BannerExists(event_id)
            } else {
                AttachmentError::repository(e.to_string())
            }
        })?;

        Ok(to_domain(model))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AttachmentError> {
        let result = event_attachments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert domain attachment type to database enum.
fn to_db_attachment_type(t: AttachmentType) -> DbAttachmentType {
    match t {
        AttachmentType::Banner => DbAttachmentType::Banner,
        AttachmentType::EventImage => DbAttachmentType::EventImage,
    }
}

/// Convert database attachment type to domain enum.
fn from_db_attachment_type(t: DbAttachmentType) -> AttachmentType {
    match t {
        DbAttachmentType::Banner => AttachmentType::Banner,
        DbAttachmentType::EventImage => AttachmentType::EventImage,
    }
}

/// Convert database model to domain model.
pub(crate) fn to_domain(model: event_attachments::Model) -> Attachment {
    Attachment {
        id: model.id,
        event_id: model.event_id,
        attachment_cloud_id: model.attachment_cloud_id,
        attachment_name: model.attachment_name,
        attachment_type: from_db_attachment_type(model.attachment_type),
        active: model.active,
        created: model.created.with_timezone(&Utc),
        modified: model.modified.with_timezone(&Utc),
    }
}
