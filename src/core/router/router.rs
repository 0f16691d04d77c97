//! Latency router facade
//!
//! The two entry points the dispatch loop uses: `report_outcome` after every
//! call and `choose_deployment` before the next one. The facade holds no state of
//! its own beyond the shared store handle; it never returns an error, degrading
//! to "no data" when the statistics backend is unavailable.

use super::deployment::Deployment;
use super::metrics::{RouterMetrics, RouterMetricsSnapshot};
use super::recorder::LatencyRecorder;
use super::selection::LatencySelector;
use super::store::WindowedStatStore;
use super::types::{CallOutcome, GroupLatencyMap};
use crate::config::{CacheBackendConfig, Config, LatencyRoutingConfig};
use crate::core::cache::{InMemoryStatsCache, StatsCache};
use crate::utils::error::Result;
use crate::utils::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Lowest-latency router over a shared statistics store
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
///
/// ## Example
///
/// ```rust
/// use latency_router::core::router::{Deployment, LatencyRouter};
/// use latency_router::config::LatencyRoutingConfig;
///
/// # tokio_test::block_on(async {
/// let router = LatencyRouter::in_memory(LatencyRoutingConfig::default());
/// let deployments = vec![Deployment::new("a", "gpt-4"), Deployment::new("b", "gpt-4")];
///
/// let chosen = router.choose_deployment("gpt-4", &deployments).await;
/// assert_eq!(chosen.map(|d| d.id), Some("a".to_string()));
/// # });
/// ```
#[derive(Clone)]
pub struct LatencyRouter {
    store: WindowedStatStore,
    recorder: LatencyRecorder,
    selector: LatencySelector,
    clock: Arc<dyn Clock>,
    config: LatencyRoutingConfig,
}

impl LatencyRouter {
    /// Create a router over `cache`, reading time from `clock`
    pub fn new(
        cache: Arc<dyn StatsCache>,
        config: LatencyRoutingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = WindowedStatStore::new(cache, &config);
        info!(
            backend = store.backend_name(),
            latency_window_cap = store.latency_window_cap(),
            stats_ttl_secs = config.stats_ttl_seconds,
            lowest_latency_buffer = config.lowest_latency_buffer,
            "Latency router initialized"
        );

        Self {
            recorder: LatencyRecorder::new(store.clone()),
            selector: LatencySelector::new(store.clone(), config.lowest_latency_buffer),
            store,
            clock,
            config,
        }
    }

    /// Router over a process-local cache and the system clock
    pub fn in_memory(config: LatencyRoutingConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Router over a process-local cache sharing `clock` for TTLs and minute buckets
    pub fn with_clock(config: LatencyRoutingConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(InMemoryStatsCache::with_clock(clock.clone()));
        Self::new(cache, config, clock)
    }

    /// Build the router described by `config`, connecting the configured backend
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache: Arc<dyn StatsCache> = match &config.cache {
            CacheBackendConfig::InMemory => Arc::new(InMemoryStatsCache::new()),
            #[cfg(feature = "redis")]
            CacheBackendConfig::Redis { url } => {
                let cache = crate::core::cache::RedisStatsCache::connect(url).await?;
                cache.ping().await?;
                Arc::new(cache)
            }
            #[cfg(not(feature = "redis"))]
            CacheBackendConfig::Redis { .. } => {
                return Err(crate::utils::error::RouterError::Config(
                    "Redis backend requires the `redis` feature".to_string(),
                ));
            }
        };

        Ok(Self::new(cache, config.routing.clone(), Arc::new(SystemClock)))
    }

    /// The routing configuration in effect
    pub fn config(&self) -> &LatencyRoutingConfig {
        &self.config
    }

    /// Report the outcome of a call
    ///
    /// Successful calls update the latency history and the current minute's
    /// request and token counters; failed calls are not counted. Never fails: a
    /// backend error is logged and the update dropped.
    pub async fn report_outcome(&self, outcome: &CallOutcome) {
        self.report_outcome_at(outcome, self.clock.now()).await;
    }

    /// [`report_outcome`](Self::report_outcome) with an explicit `now`
    pub async fn report_outcome_at(&self, outcome: &CallOutcome, now: DateTime<Utc>) {
        if !outcome.success {
            self.recorder
                .on_call_failed(&outcome.group, &outcome.deployment_id);
            self.metrics().record_failure_skipped();
            return;
        }

        self.recorder
            .on_call_completed(
                &outcome.group,
                &outcome.deployment_id,
                outcome.start_time,
                outcome.end_time,
                outcome.tokens_used,
                now,
            )
            .await;
    }

    /// Choose the deployment to try next for `group`
    ///
    /// Returns `None` when every candidate has reached a limit this minute; the
    /// caller decides whether to queue, reject, or widen the candidate set.
    pub async fn choose_deployment(
        &self,
        group: &str,
        candidates: &[Deployment],
    ) -> Option<Deployment> {
        self.choose_deployment_at(group, candidates, self.clock.now())
            .await
    }

    /// [`choose_deployment`](Self::choose_deployment) with an explicit `now`
    pub async fn choose_deployment_at(
        &self,
        group: &str,
        candidates: &[Deployment],
        now: DateTime<Utc>,
    ) -> Option<Deployment> {
        let chosen = self.selector.select(group, candidates, now).await;
        self.metrics().record_selection(chosen.is_some());
        chosen
    }

    /// Current statistics snapshot of `group`, `None` when absent or expired
    pub async fn group_stats(&self, group: &str) -> Option<GroupLatencyMap> {
        self.store.read(group).await
    }

    /// Activity counters
    pub fn metrics_snapshot(&self) -> RouterMetricsSnapshot {
        self.metrics().snapshot()
    }

    fn metrics(&self) -> &RouterMetrics {
        self.store.metrics()
    }
}
