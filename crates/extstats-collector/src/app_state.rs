//! Shared application state for the collector.
//!
//! Holds the single `StatsStore`; cloned into every handler by axum's `State`
//! extractor.

use std::sync::Arc;

use extstats_core::error::Result;

use crate::config::StorageSection;
use crate::store::{self, StatsStore};

#[derive(Clone)]
pub struct AppState {
    store: Arc<StatsStore>,
}

impl AppState {
    /// Open the configured backend and load persisted stats.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub async fn new(storage: &StorageSection) -> Result<Self> {
        let backend = store::open_backend(storage)?;
        let store = Arc::new(StatsStore::open(backend).await);
        Ok(Self::with_store(store))
    }

    /// Build state around an existing store (tests, embedding).
    pub fn with_store(store: Arc<StatsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<StatsStore> {
        Arc::clone(&self.store)
    }
}
