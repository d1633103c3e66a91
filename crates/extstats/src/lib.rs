//! Top-level facade crate for extstats.
//!
//! Re-exports the core types and the collector library so users can depend on a single crate.

pub mod core {
    pub use extstats_core::*;
}

pub mod collector {
    pub use extstats_collector::*;
}
