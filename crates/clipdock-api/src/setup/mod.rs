//! Application setup and initialization
//!
//! All startup logic lives here instead of main.rs so the pieces stay
//! individually testable.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use clipdock_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let metadata = database::setup_metadata_store(&config).await?;

    let (media_storage, memory_storage) = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        metadata,
        media_storage,
        memory_storage,
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
