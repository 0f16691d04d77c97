//! Statistics cache backend configuration

use serde::{Deserialize, Serialize};

/// Backend holding the windowed routing statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheBackendConfig {
    /// Process-local store
    #[default]
    InMemory,
    /// Shared Redis store, for routers running in several processes
    Redis {
        /// Connection URL, e.g. `redis://localhost:6379/0`
        url: String,
    },
}
