//! Event attachment routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{IdRequest, uuid_field, validate_uuid};
use crate::{
    AppState,
    error::ApiResult,
    extractors::ValidatedJson,
    middleware::AuthUser,
};
use herkey_core::attachment::{
    Attachment, AttachmentRepository as AttachmentRepoTrait, AttachmentService, AttachmentType,
    CreateAttachmentInput, UploadTarget,
};
use herkey_db::AttachmentRepository;

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/event-attachments",
            post(create_attachment).delete(delete_attachment),
        )
        .route(
            "/event-attachments/get_pre_signed_url",
            post(request_upload_target),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording an uploaded attachment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttachmentRequest {
    /// Owning event.
    #[serde(alias = "event_id")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_uuid")
    )]
    pub event: Option<String>,
    /// Key returned by `get_pre_signed_url`.
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub attachment_cloud_id: Option<String>,
    /// Display name.
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub attachment_name: Option<String>,
    /// `BANNER` or `EVENT_IMAGE`; defaults to `EVENT_IMAGE`.
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_attachment_type"))]
    pub attachment_type: Option<String>,
}

/// Request body for an upload target.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadTargetRequest {
    /// Client-side file name; only the part before the first `.` is kept.
    #[validate(required(message = "This field is required."))]
    pub file_name: Option<String>,
}

/// An attachment as returned by the API.
///
/// `signed_url` is a presigned download URL. When presigning fails the URL
/// is `null` and `signed_url_error` carries the reason.
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    /// Attachment ID.
    pub id: Uuid,
    /// Event ID.
    pub event_id: Uuid,
    /// Object key.
    pub attachment_cloud_id: Option<String>,
    /// Display name.
    pub attachment_name: Option<String>,
    /// `BANNER` or `EVENT_IMAGE`.
    #[serde(rename = "type")]
    pub attachment_type: &'static str,
    /// Active flag.
    pub active: bool,
    /// Created at.
    pub created: DateTime<Utc>,
    /// Last modified at.
    pub modified: DateTime<Utc>,
    /// Presigned download URL.
    pub signed_url: Option<String>,
    /// Why `signed_url` is missing, if presigning failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_url_error: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validator hook for the attachment `type` field.
pub(crate) fn validate_attachment_type(value: &str) -> Result<(), ValidationError> {
    if AttachmentType::parse(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_choice")
            .with_message(format!("\"{value}\" is not a valid choice.").into()))
    }
}

pub(crate) fn attachment_service(state: &AppState) -> AttachmentService<AttachmentRepository> {
    AttachmentService::new(
        Arc::new(AttachmentRepository::new((*state.db).clone())),
        state.storage.clone(),
    )
}

/// Builds the response, presigning a download URL for the stored object.
pub(crate) async fn render_attachment<R: AttachmentRepoTrait>(
    service: &AttachmentService<R>,
    attachment: Attachment,
) -> AttachmentResponse {
    let (signed_url, signed_url_error) = match service.resolve_download_url(&attachment).await {
        Ok(url) => (url.map(|u| u.url), None),
        Err(e) => {
            warn!(attachment_id = %attachment.id, error = %e, "Could not presign download URL");
            (None, Some(e.to_string()))
        }
    };

    AttachmentResponse {
        id: attachment.id,
        event_id: attachment.event_id,
        attachment_cloud_id: attachment.attachment_cloud_id,
        attachment_name: attachment.attachment_name,
        attachment_type: attachment.attachment_type.as_str(),
        active: attachment.active,
        created: attachment.created,
        modified: attachment.modified,
        signed_url,
        signed_url_error,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /event-attachments - Record an attachment on an event.
async fn create_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateAttachmentRequest>,
) -> ApiResult<(StatusCode, Json<AttachmentResponse>)> {
    let event_id = uuid_field("event", payload.event.as_deref())?;
    let service = attachment_service(&state);

    let attachment = service
        .create(CreateAttachmentInput {
            event_id,
            attachment_cloud_id: payload.attachment_cloud_id,
            attachment_name: payload.attachment_name,
            attachment_type: payload
                .attachment_type
                .as_deref()
                .and_then(AttachmentType::parse)
                .unwrap_or_default(),
        })
        .await?;

    info!(
        event_id = %event_id,
        attachment_id = %attachment.id,
        attachment_type = attachment.attachment_type.as_str(),
        user_id = auth.user_id(),
        "Attachment created"
    );

    let response = render_attachment(&service, attachment).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /event-attachments - Remove an attachment record; the object stays.
async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<IdRequest>,
) -> ApiResult<StatusCode> {
    let id = payload.id()?;
    attachment_service(&state).delete(id).await?;

    info!(
        attachment_id = %id,
        deleted_by = auth.user_id(),
        "Attachment removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /event-attachments/get_pre_signed_url - Fresh key plus presigned upload.
async fn request_upload_target(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<UploadTargetRequest>,
) -> ApiResult<Json<UploadTarget>> {
    let file_name = payload.file_name.unwrap_or_default();
    let target = attachment_service(&state)
        .request_upload_target(&file_name)
        .await?;

    info!(
        cloud_id = %target.cloud_id,
        user_id = auth.user_id(),
        "Upload target issued"
    );

    Ok(Json(target))
}
