//! Latency routing configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency routing configuration
///
/// ## Defaults
///
/// - `latency_window_cap`: 10 samples per deployment
/// - `stats_ttl_seconds`: 60
/// - `lowest_latency_buffer`: 0.0 (always pick the single fastest deployment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRoutingConfig {
    /// Maximum latency samples kept per deployment (oldest evicted first)
    #[serde(default = "default_latency_window_cap")]
    pub latency_window_cap: usize,
    /// Seconds a group's statistics survive without a refreshing write
    #[serde(default = "default_stats_ttl_seconds")]
    pub stats_ttl_seconds: u64,
    /// Relative slack above the best average latency within which deployments
    /// are picked at random (0.0 disables)
    #[serde(default)]
    pub lowest_latency_buffer: f64,
}

impl Default for LatencyRoutingConfig {
    fn default() -> Self {
        Self {
            latency_window_cap: default_latency_window_cap(),
            stats_ttl_seconds: default_stats_ttl_seconds(),
            lowest_latency_buffer: 0.0,
        }
    }
}

impl LatencyRoutingConfig {
    /// Build a config from the two construction-time knobs
    pub fn new(latency_window_cap: usize, stats_ttl_seconds: u64) -> Self {
        Self {
            latency_window_cap,
            stats_ttl_seconds,
            ..Default::default()
        }
    }

    /// Set the lowest-latency buffer (builder pattern)
    pub fn with_lowest_latency_buffer(mut self, buffer: f64) -> Self {
        self.lowest_latency_buffer = buffer;
        self
    }

    /// Statistics TTL as a duration
    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_ttl_seconds)
    }
}
