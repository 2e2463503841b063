//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::DocumentService;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use studybudd_core::Config;
use studybudd_db::DocumentRepository;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration, before anything connects
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        app_name = %config.app_name(),
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let blob_store = storage::setup_storage(&config).await?;

    let documents = DocumentService::new(blob_store, Arc::new(DocumentRepository::new(pool)));
    let state = Arc::new(AppState::new(documents));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
