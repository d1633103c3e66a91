//! Embedded key-value backend (`sled`).
//!
//! Layout:
//! - `stats/installations`, `stats/filtered_results`, `stats/last_updated`:
//!   big-endian `u64`
//! - `clients/<id>`: one empty value per seen client
//!
//! Each persist is a single multi-key transaction followed by a flush, so an
//! acknowledged report is on disk and partially applied updates never are.
//! A snapshot replaces the whole layout: all counters are rewritten and
//! client keys missing from the record are removed.
//! sled is blocking; all calls run on the blocking pool.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use sled::transaction::TransactionResult;

use extstats_core::error::{Result, StatsError};
use extstats_core::StatsRecord;

use crate::store::backend::{Change, StatsBackend};

pub const KEY_INSTALLATIONS: &[u8] = b"stats/installations";
pub const KEY_FILTERED_RESULTS: &[u8] = b"stats/filtered_results";
pub const KEY_LAST_UPDATED: &[u8] = b"stats/last_updated";
pub const CLIENT_PREFIX: &[u8] = b"clients/";

/// Keys to write in one commit.
struct Batch {
    puts: Vec<(Vec<u8>, Vec<u8>)>,
    /// Drop `clients/*` keys not present in `puts`.
    prune_clients: bool,
}

pub struct KvBackend {
    db: sled::Db,
}

impl KvBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            StatsError::Storage(format!("open kv store {} failed: {e}", path.display()))
        })?;
        Ok(Self { db })
    }

    /// Wrap an already opened database.
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }
}

fn storage_err(e: impl std::fmt::Display) -> StatsError {
    StatsError::Storage(format!("kv: {e}"))
}

fn client_key(client_id: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(CLIENT_PREFIX.len() + client_id.len());
    k.extend_from_slice(CLIENT_PREFIX);
    k.extend_from_slice(client_id.as_bytes());
    k
}

fn counter(key: &[u8], v: u64) -> (Vec<u8>, Vec<u8>) {
    (key.to_vec(), v.to_be_bytes().to_vec())
}

fn read_counter(db: &sled::Db, key: &[u8]) -> Result<Option<u64>> {
    let Some(raw) = db.get(key).map_err(storage_err)? else {
        return Ok(None);
    };
    let bytes = <[u8; 8]>::try_from(&raw[..]).map_err(|_| {
        StatsError::Storage(format!(
            "corrupt counter {} ({} bytes)",
            String::from_utf8_lossy(key),
            raw.len()
        ))
    })?;
    Ok(Some(u64::from_be_bytes(bytes)))
}

fn read_record(db: &sled::Db) -> Result<Option<StatsRecord>> {
    let installations = read_counter(db, KEY_INSTALLATIONS)?;
    let filtered = read_counter(db, KEY_FILTERED_RESULTS)?;
    let last_updated = read_counter(db, KEY_LAST_UPDATED)?;

    let mut clients = Vec::new();
    for entry in db.scan_prefix(CLIENT_PREFIX) {
        let (k, _) = entry.map_err(storage_err)?;
        let id = std::str::from_utf8(&k[CLIENT_PREFIX.len()..])
            .map_err(|_| StatsError::Storage("corrupt client key (not utf-8)".into()))?;
        clients.push(id.to_string());
    }

    if installations.is_none() && filtered.is_none() && last_updated.is_none() && clients.is_empty() {
        return Ok(None);
    }

    let rec = StatsRecord::from_parts(
        filtered.unwrap_or(0),
        last_updated.unwrap_or(0),
        clients,
    );
    if let Some(stored) = installations {
        if stored != rec.install_count() {
            tracing::warn!(
                stored,
                derived = rec.install_count(),
                "kv install counter disagrees with client keys; using client keys"
            );
        }
    }
    Ok(Some(rec))
}

fn batch_for(record: &StatsRecord, change: Change<'_>) -> Batch {
    let mut puts = vec![counter(KEY_LAST_UPDATED, record.last_updated())];
    let mut prune_clients = false;
    match change {
        Change::Install { client_id } => {
            puts.push((client_key(client_id), Vec::new()));
            puts.push(counter(KEY_INSTALLATIONS, record.install_count()));
        }
        Change::Filter => {
            puts.push(counter(KEY_FILTERED_RESULTS, record.filtered_result_count()));
        }
        Change::Snapshot => {
            puts.push(counter(KEY_INSTALLATIONS, record.install_count()));
            puts.push(counter(KEY_FILTERED_RESULTS, record.filtered_result_count()));
            puts.extend(record.clients().map(|c| (client_key(c), Vec::new())));
            prune_clients = true;
        }
    }
    Batch { puts, prune_clients }
}

/// Client keys on disk that `batch` does not write.
fn stale_client_keys(db: &sled::Db, batch: &Batch) -> Result<Vec<sled::IVec>> {
    if !batch.prune_clients {
        return Ok(Vec::new());
    }
    let keep: HashSet<&[u8]> = batch.puts.iter().map(|(k, _)| k.as_slice()).collect();
    let mut stale = Vec::new();
    for entry in db.scan_prefix(CLIENT_PREFIX) {
        let (k, _) = entry.map_err(storage_err)?;
        if !keep.contains(&&k[..]) {
            stale.push(k);
        }
    }
    Ok(stale)
}

fn commit(db: &sled::Db, batch: &Batch) -> Result<()> {
    // persists are serialized by the store, so the scan cannot race a write
    let stale = stale_client_keys(db, batch)?;
    let res: TransactionResult<()> = db.transaction(|tx| {
        for k in &stale {
            tx.remove(k.clone())?;
        }
        for (k, v) in &batch.puts {
            tx.insert(k.as_slice(), v.as_slice())?;
        }
        Ok(())
    });
    res.map_err(|e| storage_err(format!("transaction failed: {e:?}")))?;
    db.flush().map_err(storage_err)?;
    if !stale.is_empty() {
        tracing::info!(removed = stale.len(), "kv snapshot dropped stale client keys");
    }
    Ok(())
}

#[async_trait]
impl StatsBackend for KvBackend {
    fn name(&self) -> &'static str {
        "kv"
    }

    async fn load(&self) -> Result<Option<StatsRecord>> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || read_record(&db))
            .await
            .map_err(|e| StatsError::Internal(format!("kv load task failed: {e}")))?
    }

    async fn persist(&self, record: &StatsRecord, change: Change<'_>) -> Result<()> {
        let batch = batch_for(record, change);
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || commit(&db, &batch))
            .await
            .map_err(|e| StatsError::Internal(format!("kv persist task failed: {e}")))?
    }
}
