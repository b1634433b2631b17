//! Agora token routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{uuid_field, validate_uuid};
use crate::{AppState, error::ApiResult, extractors::ValidatedJson, middleware::AuthUser};
use herkey_core::realtime::{RealtimeService, RealtimeToken};
use herkey_db::ParticipantRepository;

/// Creates the realtime token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/agora-token", post(create_rtc_token))
        .route("/agora-rtm-token", post(create_rtm_token))
}

/// Request body for both token endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    /// Event whose channel to join.
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_uuid")
    )]
    pub event_id: Option<String>,
}

impl TokenRequest {
    fn event_id(&self) -> ApiResult<Uuid> {
        uuid_field("event_id", self.event_id.as_deref())
    }
}

fn service(state: &AppState) -> RealtimeService<ParticipantRepository> {
    RealtimeService::new(
        state.realtime.clone(),
        Arc::new(ParticipantRepository::new((*state.db).clone())),
    )
}

/// POST /agora-token - RTC token for the caller on the event's channel.
async fn create_rtc_token(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<TokenRequest>,
) -> ApiResult<Json<RealtimeToken>> {
    let event_id = payload.event_id()?;
    let token = service(&state)
        .issue_rtc_token(event_id, auth.user_id())
        .await?;

    info!(
        event_id = %event_id,
        user_id = auth.user_id(),
        role = token.role.code(),
        "RTC token issued"
    );

    Ok(Json(token))
}

/// POST /agora-rtm-token - RTM login token for the caller.
async fn create_rtm_token(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<TokenRequest>,
) -> ApiResult<Json<RealtimeToken>> {
    let event_id = payload.event_id()?;
    let token = service(&state)
        .issue_rtm_token(event_id, auth.user_id())
        .await?;

    info!(event_id = %event_id, user_id = auth.user_id(), "RTM token issued");

    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{app, bearer, body_json, json_request, send};

    #[tokio::test]
    async fn test_event_id_is_required() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request("POST", "/api/agora-token", Some(&auth), "{}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["fields"]["event_id"][0],
            "This field is required."
        );
    }

    #[tokio::test]
    async fn test_rtm_token_requires_auth() {
        let (router, _) = app();
        let response = send(
            router,
            json_request("POST", "/api/agora-rtm-token", None, "{}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_event_id_is_a_field_error() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request(
                "POST",
                "/api/agora-token",
                Some(&auth),
                r#"{"event_id": "not-a-uuid"}"#,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["event_id"][0], "Must be a valid UUID.");
    }

    #[tokio::test]
    async fn test_non_string_event_id_is_a_decoding_error() {
        let (router, state) = app();
        let auth = bearer(&state, 1);

        let response = send(
            router,
            json_request("POST", "/api/agora-token", Some(&auth), r#"{"event_id": 42}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Json decoding error");
    }
}
