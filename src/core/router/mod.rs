//! Latency-based deployment routing
//!
//! Picks, among interchangeable deployments of a model group, the one with the
//! lowest recent average latency that still has room under its per-minute
//! request and token limits.
//!
//! ## Module Structure
//!
//! - `deployment` - Deployment descriptors (id, group, limits, routing parameters)
//! - `types` - Call outcomes, latency records, and group snapshots
//! - `store` - Windowed statistics store over a `StatsCache`
//! - `recorder` - Turns completed calls into store updates
//! - `admission` - Per-minute rpm/tpm admission check
//! - `selection` - Lowest-latency ranking
//! - `metrics` - Activity counters
//! - `router` - `LatencyRouter` facade used by the dispatch loop

pub mod admission;
pub mod deployment;
pub mod metrics;
pub mod recorder;
pub mod router;
pub mod selection;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use admission::is_admissible;
pub use deployment::{Deployment, DeploymentId};
pub use metrics::{RouterMetrics, RouterMetricsSnapshot};
pub use recorder::LatencyRecorder;
pub use router::LatencyRouter;
pub use selection::{COLD_START_SCORE, LatencySelector};
pub use store::WindowedStatStore;
pub use types::{CallOutcome, DeploymentLatencyStats, GroupLatencyMap, LatencyRecord};
