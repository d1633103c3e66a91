//! Periodic full snapshot of the stats record.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::StatsStore;

/// Snapshot `store` every `every` until `shutdown` flips (or its sender drops).
pub fn spawn_snapshot_task(
    store: Arc<StatsStore>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(every_secs = every.as_secs(), "snapshot task started");
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; state was just loaded
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match store.snapshot().await {
                        Ok(()) => tracing::debug!(backend = store.backend_name(), "stats snapshot written"),
                        Err(e) => tracing::warn!(
                            backend = store.backend_name(),
                            error = %e,
                            "stats snapshot failed"
                        ),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("snapshot task stopping");
                        return;
                    }
                }
            }
        }
    })
}
