//! JSON API handlers.

pub mod stats;
