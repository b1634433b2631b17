//! API error type and its HTTP rendering.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use herkey_core::attachment::AttachmentError;
use herkey_core::auth::AuthError;
use herkey_core::event::EventError;
use herkey_core::participant::ParticipantError;
use herkey_core::realtime::RealtimeError;
use herkey_shared::AppError;
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name to the messages describing what is wrong with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors returned from handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A domain or infrastructure error.
    App(AppError),
    /// One or more request fields are invalid.
    Fields(FieldErrors),
    /// The body was not valid JSON for the endpoint.
    JsonDecoding,
}

impl ApiError {
    /// Single-field validation failure.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::Fields(fields)
    }

    /// Missing or rejected credentials.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::App(AppError::Unauthorized(message.into()))
    }

    /// Unexpected server-side failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::App(AppError::Internal(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::JsonDecoding => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "result": "error",
                    "message": "Json decoding error"
                })),
            )
                .into_response(),
            Self::Fields(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "VALIDATION_ERROR",
                    "message": "Invalid input.",
                    "fields": fields
                })),
            )
                .into_response(),
            Self::App(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = if err.is_server_error() {
                    error!(error = %err, code = err.error_code(), "Request failed");
                    "An internal error occurred".to_string()
                } else {
                    err.to_string()
                };
                (
                    status,
                    Json(json!({
                        "error": err.error_code(),
                        "message": message
                    })),
                )
                    .into_response()
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| default_message(&e.code), ToString::to_string)
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self::Fields(fields)
    }
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "This field is required.".to_string(),
        "length" => "Ensure this field has a valid length.".to_string(),
        other => format!("Invalid value ({other})."),
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation { field, message } => Self::field(field, message),
            other => Self::App(other.into()),
        }
    }
}

impl From<ParticipantError> for ApiError {
    fn from(err: ParticipantError) -> Self {
        Self::App(err.into())
    }
}

impl From<AttachmentError> for ApiError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::Validation { field, message } => Self::field(field, message),
            other => Self::App(other.into()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation { field, message } => Self::field(field, message),
            other => Self::App(other.into()),
        }
    }
}

impl From<RealtimeError> for ApiError {
    fn from(err: RealtimeError) -> Self {
        Self::App(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use uuid::Uuid;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_json_decoding_body() {
        let (status, body) = render(ApiError::JsonDecoding).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"result": "error", "message": "Json decoding error"})
        );
    }

    #[tokio::test]
    async fn test_domain_validation_becomes_field_error() {
        let err: ApiError = EventError::validation("title", "This field may not be blank.").into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["title"][0], "This field may not be blank.");
    }

    #[tokio::test]
    async fn test_banner_conflict_is_400() {
        let err: ApiError = AttachmentError::BannerExists(Uuid::nil()).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let err: ApiError = AttachmentError::repository("connection reset").into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[rstest]
    #[case(RealtimeError::EventNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(
        RealtimeError::NotParticipant { event_id: Uuid::nil(), user_id: 3 },
        StatusCode::NOT_FOUND
    )]
    #[case(RealtimeError::Validation("empty channel".into()), StatusCode::BAD_REQUEST)]
    #[case(RealtimeError::Signing("hmac".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[tokio::test]
    async fn test_realtime_statuses(#[case] err: RealtimeError, #[case] expected: StatusCode) {
        let (status, _) = render(err.into()).await;
        assert_eq!(status, expected);
    }
}
