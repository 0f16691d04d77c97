//! Configuration data models
//!
//! This module defines the configuration structures of the latency router.

pub mod cache;
pub mod logging;
pub mod router;

pub use cache::*;
pub use logging::*;
pub use router::*;

/// Default cap on retained latency samples per deployment
pub fn default_latency_window_cap() -> usize {
    10
}

/// Default lifetime of a group's statistics in seconds
pub fn default_stats_ttl_seconds() -> u64 {
    60
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}
