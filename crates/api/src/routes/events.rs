//! Event routes, including the per-event participant actions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::IdRequest;
use super::attachments::{AttachmentResponse, attachment_service, render_attachment};
use super::participants::{
    ParticipantResponse, participant_type_or_default, validate_participant_type,
};
use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use herkey_core::event::{
    CreateEventInput, Event, EventDetails, EventService, EventStatus, EventType, UpdateEventInput,
};
use herkey_db::{EventRepository, ParticipantRepository};

/// Creates the event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(list_events).post(create_event).delete(delete_event),
        )
        .route("/events/{id}", get(get_event).put(update_event))
        .route("/events/{id}/participants", post(add_participant))
        .route("/events/{id}/get_participants", get(list_participants))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an event.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Title.
    #[validate(required(message = "This field is required."))]
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// `SCHEDULED`, `LIVE` or `COMPLETED`; defaults to `SCHEDULED`.
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: Option<String>,
    /// RFC 3339 start time.
    #[validate(custom(function = "validate_datetime"))]
    pub scheduled_date: Option<String>,
    /// External streaming session name.
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub stream_session_id: Option<String>,
    /// Active flag; defaults to `true`.
    pub active: Option<bool>,
}

/// Request body for updating an event; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle type.
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: Option<String>,
    /// RFC 3339 start time.
    #[validate(custom(function = "validate_datetime"))]
    pub scheduled_date: Option<String>,
    /// External streaming session name.
    #[validate(length(
        max = 100,
        message = "Ensure this field has no more than 100 characters."
    ))]
    pub stream_session_id: Option<String>,
    /// Active flag.
    pub active: Option<bool>,
    /// `ACTIVE` or `INACTIVE`.
    #[validate(custom(function = "validate_event_status"))]
    pub status: Option<String>,
}

/// Request body for adding a participant to an event.
#[derive(Debug, Deserialize, Validate)]
pub struct AddParticipantRequest {
    /// User to add; defaults to the caller.
    pub user_id: Option<i32>,
    /// `HOST` or `PARTICIPANT`; defaults to `PARTICIPANT`.
    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_participant_type"))]
    pub participant_type: Option<String>,
}

/// An event with its participants and attachments.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Event ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Activation status.
    pub status: EventStatus,
    /// Last activation.
    pub activate_date: Option<DateTime<Utc>>,
    /// Last deactivation.
    pub deactivate_date: Option<DateTime<Utc>>,
    /// Planned start.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
    /// External streaming session name.
    pub stream_session_id: Option<String>,
    /// Created at.
    pub created: DateTime<Utc>,
    /// Last modified at.
    pub modified: DateTime<Utc>,
    /// Participants with user summaries.
    pub participants: Vec<ParticipantResponse>,
    /// Attachments with download URLs.
    pub attachments: Vec<AttachmentResponse>,
}

impl EventResponse {
    fn new(
        event: Event,
        participants: Vec<ParticipantResponse>,
        attachments: Vec<AttachmentResponse>,
    ) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            event_type: event.event_type,
            status: event.status,
            activate_date: event.activate_date,
            deactivate_date: event.deactivate_date,
            scheduled_date: event.scheduled_date,
            active: event.active,
            stream_session_id: event.stream_session_id,
            created: event.created,
            modified: event.modified,
            participants,
            attachments,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn invalid_choice(value: &str) -> ValidationError {
    ValidationError::new("invalid_choice")
        .with_message(format!("\"{value}\" is not a valid choice.").into())
}

fn validate_event_type(value: &str) -> Result<(), ValidationError> {
    EventType::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid_choice(value))
}

fn validate_event_status(value: &str) -> Result<(), ValidationError> {
    EventStatus::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid_choice(value))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    parse_datetime(value).map(|_| ()).ok_or_else(|| {
        ValidationError::new("invalid_datetime").with_message(
            "Datetime has wrong format. Use RFC 3339, e.g. 2026-10-19T18:00:00Z.".into(),
        )
    })
}

fn service(state: &AppState) -> EventService<EventRepository, ParticipantRepository> {
    EventService::new(
        Arc::new(EventRepository::new((*state.db).clone())),
        Arc::new(ParticipantRepository::new((*state.db).clone())),
    )
}

async fn render_details(state: &AppState, details: EventDetails) -> EventResponse {
    let attachments = attachment_service(state);
    let mut rendered = Vec::with_capacity(details.attachments.len());
    for attachment in details.attachments {
        rendered.push(render_attachment(&attachments, attachment).await);
    }

    EventResponse::new(
        details.event,
        details.participants.into_iter().map(Into::into).collect(),
        rendered,
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /events
async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let event = service(&state)
        .create(CreateEventInput {
            title: payload.title.unwrap_or_default(),
            description: payload.description,
            event_type: payload
                .event_type
                .as_deref()
                .and_then(EventType::parse)
                .unwrap_or_default(),
            scheduled_date: payload.scheduled_date.as_deref().and_then(parse_datetime),
            stream_session_id: payload.stream_session_id,
            active: payload.active.unwrap_or(true),
        })
        .await?;

    info!(event_id = %event.id, user_id = auth.user_id(), "Event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse::new(event, Vec::new(), Vec::new())),
    ))
}

/// PUT /events/{id}
async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let service = service(&state);
    service
        .update(
            id,
            UpdateEventInput {
                title: payload.title,
                description: payload.description,
                event_type: payload.event_type.as_deref().and_then(EventType::parse),
                scheduled_date: payload.scheduled_date.as_deref().and_then(parse_datetime),
                active: payload.active,
                stream_session_id: payload.stream_session_id,
                status: payload.status.as_deref().and_then(EventStatus::parse),
            },
        )
        .await?;

    info!(event_id = %id, user_id = auth.user_id(), "Event updated");

    let details = service.get(id).await?;
    Ok(Json(render_details(&state, details).await))
}

/// GET /events
async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = service(&state).list().await?;

    let mut rendered = Vec::with_capacity(events.len());
    for details in events {
        rendered.push(render_details(&state, details).await);
    }
    Ok(Json(rendered))
}

/// GET /events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventResponse>> {
    let details = service(&state).get(id).await?;
    Ok(Json(render_details(&state, details).await))
}

/// DELETE /events - Delete the event named in the body, cascading.
async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<IdRequest>,
) -> ApiResult<StatusCode> {
    let id = payload.id()?;
    service(&state).delete(id).await?;

    info!(event_id = %id, user_id = auth.user_id(), "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /events/{id}/participants
async fn add_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddParticipantRequest>,
) -> ApiResult<(StatusCode, Json<ParticipantResponse>)> {
    let user_id = payload.user_id.unwrap_or_else(|| auth.user_id());
    let participant = service(&state)
        .add_participant(
            id,
            user_id,
            participant_type_or_default(payload.participant_type.as_deref()),
        )
        .await?;

    info!(
        event_id = %id,
        participant_id = %participant.id,
        user_id,
        added_by = auth.user_id(),
        "Participant added"
    );

    Ok((StatusCode::CREATED, Json(participant.into())))
}

/// GET /events/{id}/get_participants
async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ParticipantResponse>>> {
    let participants = service(&state).list_participants(id).await?;
    Ok(Json(participants.into_iter().map(Into::into).collect()))
}
