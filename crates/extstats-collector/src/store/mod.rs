//! Stats store: the shared record plus its persistence.
//!
//! One `StatsStore` is built at startup and handed to handlers through
//! `AppState`. Mutations hold the write lock across check, mutate and
//! persist, so concurrent reports for the same client count once and writes
//! reach the backend in mutation order. A failed write is logged, never
//! rolled back, and upgrades the next write to a full snapshot.

pub mod backend;
pub mod file;
pub mod kv;
pub mod snapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use extstats_core::error::Result;
use extstats_core::{now_millis, StatsRecord, Summary};

pub use backend::{open_backend, Change, StatsBackend};
pub use file::FileBackend;
pub use kv::KvBackend;
pub use snapshot::spawn_snapshot_task;

pub struct StatsStore {
    record: RwLock<StatsRecord>,
    backend: Arc<dyn StatsBackend>,
    dirty: AtomicBool,
}

impl StatsStore {
    /// Load persisted state. Missing or unreadable state starts from zero.
    pub async fn open(backend: Arc<dyn StatsBackend>) -> Self {
        // after a failed load, storage may still hold keys the record lacks;
        // starting dirty makes the first write replace them wholesale
        let (record, dirty) = match backend.load().await {
            Ok(Some(rec)) => {
                tracing::info!(
                    backend = backend.name(),
                    installs = rec.install_count(),
                    filtered = rec.filtered_result_count(),
                    "stats loaded"
                );
                (rec, false)
            }
            Ok(None) => {
                tracing::info!(backend = backend.name(), "no persisted stats, starting from zero");
                (StatsRecord::new(), false)
            }
            Err(e) => {
                tracing::warn!(
                    backend = backend.name(),
                    error = %e,
                    "failed to load stats, starting from zero"
                );
                (StatsRecord::new(), true)
            }
        };

        Self {
            record: RwLock::new(record),
            backend,
            dirty: AtomicBool::new(dirty),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Copy of the full record, clients included. Internal use only.
    pub async fn read(&self) -> StatsRecord {
        self.record.read().await.clone()
    }

    pub async fn summary(&self) -> Summary {
        self.record.read().await.summary()
    }

    /// Count `client_id` once. Returns whether this call counted it.
    pub async fn record_install(&self, client_id: &str) -> Result<bool> {
        let mut rec = self.record.write().await;
        let counted = rec.record_install(client_id, now_millis())?;
        if counted {
            self.persist(&rec, Change::Install { client_id }).await;
        }
        Ok(counted)
    }

    pub async fn record_filtered(&self, count: u64) -> Result<()> {
        let mut rec = self.record.write().await;
        rec.record_filtered(count, now_millis())?;
        self.persist(&rec, Change::Filter).await;
        Ok(())
    }

    /// Write the whole record. Holds only a read lock, so summaries keep flowing.
    pub async fn snapshot(&self) -> Result<()> {
        let rec = self.record.read().await;
        match self.backend.persist(&rec, Change::Snapshot).await {
            Ok(()) => {
                self.dirty.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// True after a failed load or write, until a full write succeeds.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    async fn persist(&self, rec: &StatsRecord, change: Change<'_>) {
        // a failed partial write may have dropped keys; rewrite everything
        let change = if self.is_dirty() { Change::Snapshot } else { change };
        match self.backend.persist(rec, change).await {
            Ok(()) => self.dirty.store(false, Ordering::Release),
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                tracing::error!(
                    backend = self.backend.name(),
                    code = e.client_code().as_str(),
                    error = %e,
                    "failed to persist stats; keeping in-memory state"
                );
            }
        }
    }
}
