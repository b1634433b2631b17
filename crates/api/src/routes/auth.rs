//! Token routes: obtain a token pair and refresh an access token.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use tracing::{debug, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
};
use herkey_core::auth::{AuthError, AuthService};
use herkey_db::UserRepository;
use herkey_shared::TokenType;
use herkey_shared::auth::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

/// Creates the token router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
}

/// POST /token - Exchange credentials for an access/refresh pair.
async fn obtain_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let service = AuthService::new(Arc::new(UserRepository::new((*state.db).clone())));

    let user = match service
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            info!(username = %payload.username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    let access = state
        .jwt_service
        .generate_access_token(user.id, &user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let refresh = state
        .jwt_service
        .generate_refresh_token(user.id, &user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access,
        refresh,
        user: user.info(),
    }))
}

/// POST /token/refresh - Mint a new access token from a refresh token.
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh, TokenType::Refresh)
        .map_err(|e| {
            debug!(error = %e, "Rejected refresh token");
            ApiError::unauthorized("Token is invalid or expired")
        })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("Token is invalid or expired"))?;

    let access = state
        .jwt_service
        .generate_access_token(user_id, &claims.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(RefreshResponse { access }))
}
