//! Metadata store setup

use anyhow::{Context, Result};
use clipdock_core::{Config, MetadataBackend};
use clipdock_db::{InMemoryVideoStore, MetadataStore, VideoRepository};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured metadata store. For Postgres this connects a pool and
/// runs pending migrations from the workspace `migrations/` directory.
pub async fn setup_metadata_store(config: &Config) -> Result<Arc<dyn MetadataStore>> {
    match config.metadata_backend() {
        MetadataBackend::Postgres => {
            let database_url = config
                .database_url()
                .context("DATABASE_URL must be set when METADATA_BACKEND=postgres")?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections())
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!(
                max_connections = config.db_max_connections(),
                "Database connected successfully"
            );

            let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
            let migrator = sqlx::migrate::Migrator::new(migrations_dir)
                .await
                .context("Failed to load migrations")?;
            migrator
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(VideoRepository::new(pool)))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; video records are lost on restart");
            Ok(Arc::new(InMemoryVideoStore::new()))
        }
    }
}
