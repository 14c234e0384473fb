//! Application state for the ledger API.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineConfig};
use crate::store::{MemoryStore, PayrollStore};

/// Shared application state.
///
/// Holds the loaded engine configuration and the store that applied payments
/// are committed to.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<dyn PayrollStore>,
}

impl AppState {
    /// Creates state backed by an empty in-memory store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Creates state backed by the given store.
    pub fn with_store(config: ConfigLoader, store: Arc<dyn PayrollStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.config.config()
    }

    /// Returns the store.
    pub fn store(&self) -> &dyn PayrollStore {
        self.store.as_ref()
    }
}
