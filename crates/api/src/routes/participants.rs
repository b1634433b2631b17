//! Event participant routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{IdRequest, uuid_field, validate_uuid};
use crate::{
    AppState,
    error::ApiResult,
    extractors::ValidatedJson,
    middleware::AuthUser,
};
use herkey_core::participant::{
    CreateParticipantInput, Participant, ParticipantService, ParticipantType,
};
use herkey_db::ParticipantRepository;
use herkey_shared::auth::UserInfo;

/// Creates the participant routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/event-participants",
        post(create_participant).delete(delete_participant),
    )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for joining an event as the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateParticipantRequest {
    /// Event to join.
    #[serde(alias = "event_id")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_uuid")
    )]
    pub event: Option<String>,
    /// `HOST` or `PARTICIPANT`; defaults to `PARTICIPANT`.
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_participant_type"))]
    pub participant_type: Option<String>,
}

/// A participant as returned by the API.
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    /// Participant ID.
    pub id: Uuid,
    /// Event ID.
    pub event_id: Uuid,
    /// User summary, when the user still exists.
    pub user: Option<UserInfo>,
    /// User ID.
    pub user_id: i32,
    /// Active flag.
    pub active: bool,
    /// `HOST` or `PARTICIPANT`.
    #[serde(rename = "type")]
    pub participant_type: &'static str,
    /// Created at.
    pub created: DateTime<Utc>,
    /// Last modified at.
    pub modified: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            event_id: p.event_id,
            user: p.user,
            user_id: p.user_id,
            active: p.active,
            participant_type: p.participant_type.as_str(),
            created: p.created,
            modified: p.modified,
        }
    }
}

/// Validator hook for the participant `type` field.
pub(crate) fn validate_participant_type(value: &str) -> Result<(), ValidationError> {
    if ParticipantType::parse(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_choice")
            .with_message(format!("\"{value}\" is not a valid choice.").into()))
    }
}

/// Parsed participant type, defaulting when absent.
pub(crate) fn participant_type_or_default(value: Option<&str>) -> ParticipantType {
    value.and_then(ParticipantType::parse).unwrap_or_default()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /event-participants - Join an event as the caller.
async fn create_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateParticipantRequest>,
) -> ApiResult<(StatusCode, Json<ParticipantResponse>)> {
    let service = ParticipantService::new(Arc::new(ParticipantRepository::new(
        (*state.db).clone(),
    )));

    let event_id = uuid_field("event", payload.event.as_deref())?;
    let participant = service
        .create(CreateParticipantInput {
            event_id,
            user_id: auth.user_id(),
            participant_type: participant_type_or_default(payload.participant_type.as_deref()),
        })
        .await?;

    info!(
        event_id = %event_id,
        participant_id = %participant.id,
        user_id = auth.user_id(),
        "Participant joined event"
    );

    Ok((StatusCode::CREATED, Json(participant.into())))
}

/// DELETE /event-participants - Remove a participant row by ID.
async fn delete_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<IdRequest>,
) -> ApiResult<StatusCode> {
    let id = payload.id()?;
    let service = ParticipantService::new(Arc::new(ParticipantRepository::new(
        (*state.db).clone(),
    )));

    service.delete(id).await?;

    info!(
        participant_id = %id,
        deleted_by = auth.user_id(),
        "Participant removed"
    );

    Ok(StatusCode::NO_CONTENT)
}
