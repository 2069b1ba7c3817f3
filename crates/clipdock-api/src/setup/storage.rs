//! Storage backend setup

use anyhow::Result;
use clipdock_core::{Config, StorageBackendKind};
use clipdock_storage::{create_storage, MediaStorage, MemoryStorage};
use std::sync::Arc;

/// Build the configured storage backend.
///
/// The memory backend is returned twice: once behind the trait object for the
/// upload pipeline, and once concretely so the raw retrieval route can read
/// from the same map. Both handles share the underlying store.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn MediaStorage>, Option<MemoryStorage>)> {
    if config.storage_backend() == StorageBackendKind::Memory {
        let memory = MemoryStorage::new(config.public_base_url().to_string());
        return Ok((Arc::new(memory.clone()), Some(memory)));
    }

    let storage = create_storage(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage backend: {}", e))?;

    tracing::info!(backend = %config.storage_backend(), "Storage backend initialized");

    Ok((storage, None))
}
