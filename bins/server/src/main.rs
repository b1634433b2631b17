//! Herkey API Server
//!
//! Main entry point for the Herkey events backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use herkey_api::{AppState, create_router};
use herkey_core::realtime::RealtimeConfig;
use herkey_core::storage::{StorageConfig, StorageService};
use herkey_db::connect_with;
use herkey_shared::config::LoggingConfig;
use herkey_shared::{AppConfig, JwtService};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "herkey=debug,herkey_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(config.jwt.clone());

    let storage = match &config.storage {
        Some(settings) => {
            let service = StorageConfig::from_settings(settings)
                .and_then(StorageService::from_config)
                .context("failed to initialise object storage")?;
            info!(provider = service.provider_name(), "Object storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("No [storage] section; upload and download URLs are disabled");
            None
        }
    };

    if config.agora.app_id.is_empty() || config.agora.app_certificate.is_empty() {
        warn!("Agora credentials are empty; realtime token requests will fail");
    }

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        realtime: Arc::new(RealtimeConfig::from(&config.agora)),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
