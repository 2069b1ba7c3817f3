use clipdock_core::Config;
use clipdock_db::MetadataStore;
use clipdock_storage::{MediaStorage, MemoryStorage};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub metadata: Arc<dyn MetadataStore>,
    pub storage: Arc<dyn MediaStorage>,
    /// Set only when the memory backend is active; backs the raw retrieval route.
    pub memory_storage: Option<MemoryStorage>,
}

impl AppState {
    pub fn new(
        config: Config,
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn MediaStorage>,
        memory_storage: Option<MemoryStorage>,
    ) -> Self {
        AppState {
            config,
            metadata,
            storage,
            memory_storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Handlers move AppState across tasks.
    #[test]
    fn test_state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppState>();
    }
}
