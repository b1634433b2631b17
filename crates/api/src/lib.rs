//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for events, participants, attachments, and realtime tokens
//! - Bearer authentication middleware
//! - A validating JSON extractor
//! - Error-to-response mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::Router;
use herkey_core::realtime::RealtimeConfig;
use herkey_core::storage::StorageService;
use herkey_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for attachment uploads and downloads (optional).
    pub storage: Option<Arc<StorageService>>,
    /// Agora credentials and token lifetime.
    pub realtime: Arc<RealtimeConfig>,
}

/// Creates the main application router.
///
/// `/health` sits at the root; everything else is nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod scenario_tests;
