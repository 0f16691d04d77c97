//! Latency recorder
//!
//! Turns call completions into store updates. Only successful calls are
//! recorded: a failure neither makes a deployment look fast nor consumes its
//! rate budget.

use super::store::WindowedStatStore;
use super::types::LatencyRecord;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Converts completed calls into statistics updates
#[derive(Clone)]
pub struct LatencyRecorder {
    store: WindowedStatStore,
}

impl LatencyRecorder {
    pub fn new(store: WindowedStatStore) -> Self {
        Self { store }
    }

    /// Record a successful call; returns whether the update was stored
    ///
    /// `end_time < start_time` records a zero duration, negative token counts
    /// record zero tokens. `now` selects the minute bucket.
    pub async fn on_call_completed(
        &self,
        group: &str,
        deployment_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tokens_used: i64,
        now: DateTime<Utc>,
    ) -> bool {
        if end_time < start_time {
            debug!(
                group,
                deployment = deployment_id,
                "Call ended before it started, recording zero latency"
            );
        }
        if tokens_used < 0 {
            debug!(
                group,
                deployment = deployment_id,
                tokens_used,
                "Negative token usage, recording zero tokens"
            );
        }

        let record = LatencyRecord::new(deployment_id, start_time, end_time, tokens_used, now);
        self.store.record(group, &record).await
    }

    /// Note a failed call; nothing is recorded
    pub fn on_call_failed(&self, group: &str, deployment_id: &str) {
        debug!(
            group,
            deployment = deployment_id,
            "Failed call not counted toward latency or usage"
        );
    }
}
