//! # latency-router
//!
//! Lowest-latency deployment selection for AI gateways.
//!
//! Several deployments often serve the same logical model. This crate keeps a
//! short, time-windowed history per deployment (recent latencies, requests and
//! tokens per minute) and, for every new call, picks the admissible deployment
//! with the lowest average latency. A deployment is admissible while its usage
//! in the current minute is strictly below its `rpm`/`tpm` limits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latency_router::{CallOutcome, Deployment, LatencyRouter, LatencyRoutingConfig};
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = LatencyRouter::in_memory(LatencyRoutingConfig::default());
//!     let deployments = vec![
//!         Deployment::new("azure-eu", "gpt-4").with_rpm(500),
//!         Deployment::new("azure-us", "gpt-4").with_rpm(1000),
//!     ];
//!
//!     if let Some(deployment) = router.choose_deployment("gpt-4", &deployments).await {
//!         let start = Utc::now();
//!         // ... call the deployment ...
//!         let outcome = CallOutcome::success("gpt-4", deployment.id, start, Utc::now(), 120);
//!         router.report_outcome(&outcome).await;
//!     }
//! }
//! ```
//!
//! ## Statistics backends
//!
//! The in-memory backend serves a single process. With the `redis` feature the
//! statistics can be shared by every router instance through Redis.

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

pub use config::{CacheBackendConfig, Config, LatencyRoutingConfig, LoggingConfig};
pub use core::cache::{InMemoryStatsCache, StatsCache};
#[cfg(feature = "redis")]
pub use core::cache::RedisStatsCache;
pub use core::router::{
    CallOutcome, Deployment, DeploymentId, GroupLatencyMap, LatencyRouter, RouterMetricsSnapshot,
};
pub use utils::error::{Result, RouterError};
pub use utils::time::{Clock, ManualClock, SystemClock};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
