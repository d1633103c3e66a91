use std::sync::Arc;

use async_trait::async_trait;

use extstats_core::error::Result;
use extstats_core::StatsRecord;

use crate::config::{BackendKind, StorageSection};
use crate::store::{FileBackend, KvBackend};

/// What changed since the last successful write.
///
/// Backends that can write partially (kv) use it to touch only the affected
/// keys. `Snapshot` always means "write everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Install { client_id: &'a str },
    Filter,
    Snapshot,
}

/// Durable storage for the stats record.
#[async_trait]
pub trait StatsBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing was persisted yet.
    async fn load(&self) -> Result<Option<StatsRecord>>;

    /// Write `record` (already mutated) durably before returning.
    async fn persist(&self, record: &StatsRecord, change: Change<'_>) -> Result<()>;
}

/// Open the backend selected by config.
pub fn open_backend(cfg: &StorageSection) -> Result<Arc<dyn StatsBackend>> {
    let path = cfg.path();
    let backend: Arc<dyn StatsBackend> = match cfg.backend {
        BackendKind::File => Arc::new(FileBackend::new(path)),
        BackendKind::Kv => Arc::new(KvBackend::open(path)?),
    };
    tracing::info!(backend = backend.name(), %path, "stats backend opened");
    Ok(backend)
}
