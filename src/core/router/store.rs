//! Windowed statistics store
//!
//! Owns the per-group statistics kept in a [`StatsCache`]. Each model group is
//! one cache key (`{group}_map`) with a single TTL; a record touches three fields
//! of it (latency samples, request counter, token counter) through one atomic
//! `apply` call, which also refreshes the TTL for the whole group. The same call
//! drops the deployment's counters of earlier minutes, so a group in steady use
//! holds at most the current minute's counters per deployment.
//!
//! The `try_*` methods surface backend errors. `record` and `read` absorb them:
//! a failed write is logged and dropped, a failed read is reported as "no data".

use super::metrics::RouterMetrics;
use super::types::{GroupLatencyMap, LatencyRecord, fields};
use crate::config::LatencyRoutingConfig;
use crate::core::cache::{FieldOp, StatsCache};
use crate::utils::error::Result;
use crate::utils::time::minute_bucket;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const MIN_TTL: Duration = Duration::from_secs(1);

/// Cache key holding a group's statistics
pub fn group_key(group: &str) -> String {
    format!("{}_map", group)
}

/// Keyed, time-bucketed statistics per deployment
#[derive(Clone)]
pub struct WindowedStatStore {
    cache: Arc<dyn StatsCache>,
    latency_window_cap: usize,
    ttl: Duration,
    metrics: Arc<RouterMetrics>,
}

impl WindowedStatStore {
    /// Create a store over `cache`
    ///
    /// The latency window keeps at least one sample and the TTL is at least one
    /// second.
    pub fn new(cache: Arc<dyn StatsCache>, config: &LatencyRoutingConfig) -> Self {
        Self {
            cache,
            latency_window_cap: config.latency_window_cap.max(1),
            ttl: config.stats_ttl().max(MIN_TTL),
            metrics: Arc::new(RouterMetrics::new()),
        }
    }

    /// Share `metrics` with this store (builder pattern)
    pub fn with_metrics(mut self, metrics: Arc<RouterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Counters updated by this store
    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    /// Maximum latency samples kept per deployment
    pub fn latency_window_cap(&self) -> usize {
        self.latency_window_cap
    }

    /// Lifetime of a group's statistics without a refreshing write
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Name of the backing cache, for logs
    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Record a completed call, surfacing backend errors
    pub async fn try_record(&self, group: &str, record: &LatencyRecord) -> Result<()> {
        let bucket = minute_bucket(record.observed_at);
        let id = record.deployment_id.as_str();

        let ops = [
            FieldOp::PushBounded {
                field: fields::latency(id),
                value: record.duration.as_secs_f64(),
                cap: self.latency_window_cap,
            },
            FieldOp::PruneBefore {
                prefix: fields::requests_prefix(id),
                before: bucket.clone(),
            },
            FieldOp::PruneBefore {
                prefix: fields::tokens_prefix(id),
                before: bucket.clone(),
            },
            FieldOp::Increment {
                field: fields::requests(id, &bucket),
                amount: 1,
            },
            FieldOp::Increment {
                field: fields::tokens(id, &bucket),
                amount: i64::try_from(record.tokens_used).unwrap_or(i64::MAX),
            },
        ];

        self.cache.apply(&group_key(group), &ops, self.ttl).await?;

        debug!(
            group,
            deployment = id,
            latency_secs = record.duration.as_secs_f64(),
            tokens = record.tokens_used,
            bucket = %bucket,
            "Recorded deployment latency"
        );
        Ok(())
    }

    /// Record a completed call; backend failures are logged and the update dropped
    ///
    /// Returns whether the update was stored.
    pub async fn record(&self, group: &str, record: &LatencyRecord) -> bool {
        let stored = match self.try_record(group, record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    group,
                    deployment = %record.deployment_id,
                    backend = self.backend_name(),
                    error = %e,
                    "Dropping latency record, statistics backend unavailable"
                );
                false
            }
        };
        self.metrics.record_outcome(stored);
        stored
    }

    /// Read a group's snapshot, surfacing backend errors
    ///
    /// `None` means nothing was recorded or the group's TTL elapsed.
    pub async fn try_read(&self, group: &str) -> Result<Option<GroupLatencyMap>> {
        let entry = self.cache.get(&group_key(group)).await?;
        Ok(entry.map(|entry| GroupLatencyMap::from_entry(&entry)))
    }

    /// Read a group's snapshot; a backend failure reads as "no data"
    pub async fn read(&self, group: &str) -> Option<GroupLatencyMap> {
        match self.try_read(group).await {
            Ok(map) => map,
            Err(e) => {
                self.metrics.record_read_failure();
                warn!(
                    group,
                    backend = self.backend_name(),
                    error = %e,
                    "Statistics read failed, routing without latency data"
                );
                None
            }
        }
    }
}
