//! API route definitions.

use axum::{Router, middleware};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::auth::auth_middleware,
};

pub mod attachments;
pub mod auth;
pub mod events;
pub mod health;
pub mod participants;
pub mod realtime;
pub mod users;

const INVALID_UUID: &str = "Must be a valid UUID.";

/// Body of the `DELETE` endpoints, which take the target ID in JSON.
#[derive(Debug, Deserialize, Validate)]
pub struct IdRequest {
    /// Row to delete.
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_uuid")
    )]
    pub id: Option<String>,
}

impl IdRequest {
    /// The parsed target ID.
    pub(crate) fn id(&self) -> ApiResult<Uuid> {
        uuid_field("id", self.id.as_deref())
    }
}

/// Validator hook for IDs carried as JSON strings.
pub(crate) fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_uuid").with_message(INVALID_UUID.into()))
}

/// Parses a required ID field, reporting failures against `field`.
pub(crate) fn uuid_field(field: &str, value: Option<&str>) -> ApiResult<Uuid> {
    let value = value.ok_or_else(|| ApiError::field(field, "This field is required."))?;
    Uuid::parse_str(value).map_err(|_| ApiError::field(field, INVALID_UUID))
}

/// Creates the `/api` router; everything except the token endpoints
/// requires a valid access token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(events::routes())
        .merge(participants::routes())
        .merge(attachments::routes())
        .merge(realtime::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(auth::routes()).merge(protected_routes)
}
