//! The stats record and its public projection.
//!
//! `StatsRecord` owns the client set and derives the install count from it,
//! so `install_count == clients.len()` cannot drift. Mutators take the
//! timestamp explicitly; callers pass [`now_millis`] in production and fixed
//! values in tests.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Full persisted state: two counters, last mutation time, seen clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecord")]
pub struct StatsRecord {
    install_count: u64,
    filtered_result_count: u64,
    /// 0 => never mutated.
    last_updated: u64,
    clients: BTreeSet<String>,
}

/// Lenient on-disk shape. Accepts the field names used by older deployments.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default, alias = "installations", alias = "total_installs")]
    install_count: u64,
    #[serde(default, alias = "filteredResults", alias = "filtered_results")]
    filtered_result_count: u64,
    #[serde(default, alias = "last_update")]
    last_updated: u64,
    #[serde(default)]
    clients: Vec<String>,
}

impl From<RawRecord> for StatsRecord {
    fn from(raw: RawRecord) -> Self {
        let rec = StatsRecord::from_parts(
            raw.filtered_result_count,
            raw.last_updated,
            raw.clients,
        );
        if raw.install_count != rec.install_count {
            tracing::warn!(
                stored = raw.install_count,
                derived = rec.install_count,
                "persisted install count disagrees with client set; using client set"
            );
        }
        rec
    }
}

impl StatsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a record from stored parts. The install count is derived.
    pub fn from_parts(
        filtered_result_count: u64,
        last_updated: u64,
        clients: impl IntoIterator<Item = String>,
    ) -> Self {
        let clients: BTreeSet<String> = clients
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            install_count: clients.len() as u64,
            filtered_result_count,
            last_updated,
            clients,
        }
    }

    pub fn install_count(&self) -> u64 {
        self.install_count
    }

    pub fn filtered_result_count(&self) -> u64 {
        self.filtered_result_count
    }

    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    pub fn has_client(&self, client_id: &str) -> bool {
        self.clients.contains(client_id)
    }

    pub fn clients(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(String::as_str)
    }

    /// Count an install once per distinct client.
    /// Returns `Ok(true)` if this call incremented the count.
    pub fn record_install(&mut self, client_id: &str, now: u64) -> Result<bool> {
        if client_id.is_empty() {
            return Err(StatsError::BadRequest("install report requires clientId".into()));
        }
        if self.clients.contains(client_id) {
            return Ok(false);
        }
        self.clients.insert(client_id.to_string());
        self.install_count = self.clients.len() as u64;
        self.last_updated = now;
        Ok(true)
    }

    /// Add `count` (>= 1) filtered results.
    pub fn record_filtered(&mut self, count: u64, now: u64) -> Result<()> {
        if count == 0 {
            return Err(StatsError::BadRequest("filter count must be >= 1".into()));
        }
        self.filtered_result_count = self.filtered_result_count.saturating_add(count);
        self.last_updated = now;
        Ok(())
    }

    /// Public projection. Client identifiers never leave through this.
    pub fn summary(&self) -> Summary {
        Summary {
            install_count: self.install_count,
            filtered_result_count: self.filtered_result_count,
            last_updated: self.last_updated,
        }
    }
}

/// Externally visible subset of [`StatsRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub install_count: u64,
    pub filtered_result_count: u64,
    pub last_updated: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn install_dedup_scenario() {
        let mut r = StatsRecord::new();
        assert!(r.record_install("a", 10).unwrap());
        assert_eq!(r.summary().install_count, 1);
        assert!(!r.record_install("a", 20).unwrap());
        assert_eq!(r.summary().install_count, 1);
        assert_eq!(r.last_updated(), 10);
        assert!(r.record_install("b", 30).unwrap());
        assert_eq!(r.summary().install_count, 2);

        r.record_filtered(5, 40).unwrap();
        assert_eq!(r.summary().filtered_result_count, 5);
        r.record_filtered(3, 50).unwrap();
        assert_eq!(r.summary().filtered_result_count, 8);
        assert_eq!(r.summary().last_updated, 50);
    }

    #[test]
    fn rejects_empty_client_and_zero_count() {
        let mut r = StatsRecord::new();
        let e = r.record_install("", 1).unwrap_err();
        assert_eq!(e.client_code().as_str(), "BAD_REQUEST");
        let e = r.record_filtered(0, 1).unwrap_err();
        assert_eq!(e.client_code().as_str(), "BAD_REQUEST");
        assert_eq!(r, StatsRecord::new());
    }

    #[test]
    fn filtered_saturates() {
        let mut r = StatsRecord::new();
        r.record_filtered(u64::MAX, 1).unwrap();
        r.record_filtered(7, 2).unwrap();
        assert_eq!(r.filtered_result_count(), u64::MAX);
    }

    #[test]
    fn from_parts_derives_install_count() {
        let r = StatsRecord::from_parts(4, 9, vec!["x".into(), "y".into(), "x".into(), "".into()]);
        assert_eq!(r.install_count(), 2);
        assert!(r.has_client("y"));
        assert!(!r.has_client(""));
    }
}
