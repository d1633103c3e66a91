//! Client report wire format (JSON).
//!
//! Wire shape: `{"clientId": "...", "type": "install" | "filter", "count": n}`.
//! `clientId` is required for installs, `count` is optional for filters
//! (default 1, must be >= 1) and ignored for installs. Integral floats such as
//! `5.0` are accepted as counts; fractional ones are not. Unknown extra fields
//! are tolerated since extension builds in the wild add their own.
//!
//! Decoding is panic-free: malformed input is reported as `StatsError`.

use serde::Deserialize;
use serde_json::Number;

use crate::error::{Result, StatsError};

/// Report kinds accepted by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Install,
    Filter,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Install => "install",
            ReportKind::Filter => "filter",
        }
    }
}

/// Validated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Install { client_id: String },
    Filter { count: u64 },
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Install { .. } => ReportKind::Install,
            Report::Filter { .. } => ReportKind::Filter,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReport {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    count: Option<Number>,
}

/// Decode and validate a report body.
pub fn decode_report(body: &[u8]) -> Result<Report> {
    let wire: WireReport = serde_json::from_slice(body)
        .map_err(|e| StatsError::BadRequest(format!("invalid report json: {e}")))?;

    match wire.kind.as_str() {
        "install" => {
            let client_id = wire
                .client_id
                .filter(|c| !c.is_empty())
                .ok_or_else(|| StatsError::BadRequest("install report requires clientId".into()))?;
            Ok(Report::Install { client_id })
        }
        "filter" => {
            let count = match wire.count {
                None => 1,
                Some(n) => filter_count(&n)?,
            };
            Ok(Report::Filter { count })
        }
        other => Err(StatsError::BadRequest(format!("unknown report type: {other}"))),
    }
}

fn filter_count(n: &Number) -> Result<u64> {
    let count = match (n.as_u64(), n.as_f64()) {
        (Some(c), _) => Some(c),
        (None, Some(f)) if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => {
            Some(f as u64)
        }
        _ => None,
    };
    match count {
        Some(c) if c >= 1 => Ok(c),
        _ => Err(StatsError::BadRequest(format!(
            "filter count must be an integer >= 1 (got {n})"
        ))),
    }
}
