//! extstats core: storage- and transport-agnostic types for the extension
//! telemetry collector.
//!
//! This crate defines the stats record, its public summary projection, the
//! report wire format and the shared error surface. It carries no runtime,
//! HTTP or storage dependencies so the aggregation rules can be tested on
//! their own.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `StatsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod record;
pub mod report;

/// Shared result type.
pub use error::{Result, StatsError};
pub use record::{now_millis, StatsRecord, Summary};
pub use report::{decode_report, Report, ReportKind};
