//! extstats collector library entry.
//!
//! This crate wires config, the stats store and its persistence backends,
//! the JSON API and the dashboard into one axum service. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod dashboard;
pub mod ops;
pub mod router;
pub mod store;
