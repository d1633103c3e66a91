//! Collector config loader (strict parsing).
//!
//! Sources, later wins: built-in defaults, the YAML file named by
//! `EXTSTATS_CONFIG` (default `extstats.yaml`, optional), then `PORT`.

pub mod schema;

use std::{env, fs, io};

use extstats_core::error::{Result, StatsError};

pub use schema::{BackendKind, CollectorConfig, ServerSection, StorageSection};

pub const DEFAULT_CONFIG_PATH: &str = "extstats.yaml";

/// Load config from the environment. A missing config file is not an error.
pub fn load() -> Result<CollectorConfig> {
    let path = env::var("EXTSTATS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = match fs::read_to_string(&path) {
        Ok(s) => load_from_str(&s)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(%path, "no config file, using defaults");
            CollectorConfig::default()
        }
        Err(e) => {
            return Err(StatsError::Config(format!("read config {path} failed: {e}")));
        }
    };

    let port = env::var("PORT").ok();
    let cfg = cfg.with_port_override(port.as_deref())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<CollectorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| StatsError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg: CollectorConfig = serde_yaml::from_str(s)
        .map_err(|e| StatsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
