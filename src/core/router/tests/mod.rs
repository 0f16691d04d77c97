//! Router test suite


use crate::config::LatencyRoutingConfig;
use crate::core::cache::{CacheEntry, FieldValue, InMemoryStatsCache, MockStatsCache};
use crate::core::router::router::LatencyRouter;
use crate::core::router::store::WindowedStatStore;
use crate::core::router::types::{CallOutcome, GroupLatencyMap, fields};
use crate::utils::error::RouterError;
use crate::utils::time::{ManualClock, minute_bucket};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Arc;

pub(crate) const GROUP: &str = "gpt-3.5-turbo";

/// 10:00:30 so that a few seconds either way stays in the same minute bucket
pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 30).unwrap()
}

pub(crate) fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(base_time()))
}

pub(crate) fn create_test_router(config: LatencyRoutingConfig) -> (LatencyRouter, Arc<ManualClock>) {
    let clock = manual_clock();
    let router = LatencyRouter::with_clock(config, clock.clone());
    (router, clock)
}

pub(crate) fn create_test_store(config: &LatencyRoutingConfig) -> (WindowedStatStore, Arc<ManualClock>) {
    let clock = manual_clock();
    let cache = Arc::new(InMemoryStatsCache::with_clock(clock.clone()));
    (WindowedStatStore::new(cache, config), clock)
}

/// A successful call that took `secs` seconds and finished at the clock's current time
pub(crate) fn success_outcome(
    clock: &ManualClock,
    deployment_id: &str,
    secs: f64,
    tokens: i64,
) -> CallOutcome {
    use crate::utils::time::Clock;

    let end = clock.now();
    let start = end - ChronoDuration::milliseconds((secs * 1000.0) as i64);
    CallOutcome::success(GROUP, deployment_id, start, end, tokens)
}

/// Mock backend whose every operation fails
pub(crate) fn unavailable_cache() -> MockStatsCache {
    let mut cache = MockStatsCache::new();
    cache
        .expect_apply()
        .returning(|_, _, _| Err(RouterError::Cache("connection refused".to_string())));
    cache
        .expect_get()
        .returning(|_| Err(RouterError::Cache("connection refused".to_string())));
    cache.expect_backend_name().return_const("mock");
    cache
}

/// Snapshot with the given (deployment, latencies, requests, tokens) in `now`'s minute
pub(crate) fn group_map_with(
    now: DateTime<Utc>,
    rows: &[(&str, &[f64], i64, i64)],
) -> GroupLatencyMap {
    let bucket = minute_bucket(now);
    let mut entry = CacheEntry::new();
    for (id, latencies, requests, tokens) in rows {
        if !latencies.is_empty() {
            entry.insert(fields::latency(id), FieldValue::Samples(latencies.to_vec()));
        }
        entry.insert(fields::requests(id, &bucket), FieldValue::Counter(*requests));
        entry.insert(fields::tokens(id, &bucket), FieldValue::Counter(*tokens));
    }
    GroupLatencyMap::from_entry(&entry)
}
