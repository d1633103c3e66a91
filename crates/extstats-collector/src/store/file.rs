//! Flat JSON file backend.
//!
//! Every write serializes the whole record to `<path>.tmp` and renames it over
//! `<path>`, so a crash mid-write leaves the previous file intact.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use extstats_core::error::{Result, StatsError};
use extstats_core::StatsRecord;

use crate::store::backend::{Change, StatsBackend};

pub struct FileBackend {
    path: PathBuf,
    tmp_path: PathBuf,
    // one writer at a time for the temp file
    write_gate: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
            write_gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl StatsBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Option<StatsRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StatsError::Storage(format!(
                    "read {} failed: {e}",
                    self.path.display()
                )))
            }
        };
        let rec: StatsRecord = serde_json::from_slice(&bytes).map_err(|e| {
            StatsError::Storage(format!("corrupt stats file {}: {e}", self.path.display()))
        })?;
        Ok(Some(rec))
    }

    async fn persist(&self, record: &StatsRecord, _change: Change<'_>) -> Result<()> {
        let body = serde_json::to_vec_pretty(record)
            .map_err(|e| StatsError::Internal(format!("serialize stats failed: {e}")))?;

        let _gate = self.write_gate.lock().await;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.tmp_path, &body).await?;
        tokio::fs::rename(&self.tmp_path, &self.path).await?;
        Ok(())
    }
}
