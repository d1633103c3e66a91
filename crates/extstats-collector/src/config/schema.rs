use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use extstats_core::error::{Result, StatsError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            storage: StorageSection::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StatsError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.storage.validate()?;

        Ok(())
    }

    /// Apply a raw `PORT` value (environment wins over the file).
    pub fn with_port_override(mut self, raw: Option<&str>) -> Result<Self> {
        if let Some(raw) = raw {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| StatsError::Config(format!("PORT must be a port number, got {raw:?}")))?;
            self.server.port = port;
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind host. The port is configured separately so `PORT` can override it.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(StatsError::Config("server.port must not be 0".into()));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.listen.parse().map_err(|_| {
            StatsError::Config(format!("server.listen must be an IP address, got {:?}", self.listen))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn default_listen() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pretty-printed JSON file, rewritten on every mutation.
    #[default]
    File,
    /// Embedded key-value store with atomic multi-key commits.
    Kv,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: BackendKind,

    /// Defaults depend on the backend, see [`StorageSection::path`].
    #[serde(default)]
    pub path: Option<String>,

    /// 0 disables the periodic snapshot.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: None,
            snapshot_interval_secs: default_snapshot_interval_secs(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.path().trim().is_empty() {
            return Err(StatsError::Config("storage.path must not be empty".into()));
        }
        let secs = self.snapshot_interval_secs;
        if secs != 0 && !(5..=86_400).contains(&secs) {
            return Err(StatsError::Config(
                "storage.snapshot_interval_secs must be 0 or between 5 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn path(&self) -> &str {
        match (&self.path, self.backend) {
            (Some(p), _) => p.as_str(),
            (None, BackendKind::File) => "./data/stats.json",
            (None, BackendKind::Kv) => "./data/stats.kv",
        }
    }

    pub fn snapshot_interval(&self) -> Option<Duration> {
        match self.snapshot_interval_secs {
            0 => None,
            s => Some(Duration::from_secs(s)),
        }
    }
}

fn default_snapshot_interval_secs() -> u64 {
    300
}
