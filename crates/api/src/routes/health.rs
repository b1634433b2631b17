//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
}

/// Liveness only; never touches the database.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
    })
}

/// Creates the health route, mounted outside `/api` and without auth.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
