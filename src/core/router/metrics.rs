//! Router counters
//!
//! Lock-free counters with `Relaxed` ordering; the values are diagnostic and
//! carry no cross-field invariants.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Counters of the latency router's activity
#[derive(Debug, Default)]
pub struct RouterMetrics {
    outcomes_recorded: AtomicU64,
    failures_skipped: AtomicU64,
    records_dropped: AtomicU64,
    read_failures: AtomicU64,
    selections: AtomicU64,
    no_admissible: AtomicU64,
}

/// Point-in-time copy of [`RouterMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterMetricsSnapshot {
    /// Successful calls written to the statistics store
    pub outcomes_recorded: u64,
    /// Failed calls that were deliberately not recorded
    pub failures_skipped: u64,
    /// Successful calls lost to backend errors
    pub records_dropped: u64,
    /// Selections that ran without statistics because the read failed
    pub read_failures: u64,
    /// Selections that returned a deployment
    pub selections: u64,
    /// Selections that found every candidate saturated
    pub no_admissible: u64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_outcome(&self, stored: bool) {
        if stored {
            self.outcomes_recorded.fetch_add(1, Relaxed);
        } else {
            self.records_dropped.fetch_add(1, Relaxed);
        }
    }

    pub(crate) fn record_failure_skipped(&self) {
        self.failures_skipped.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_selection(&self, selected: bool) {
        if selected {
            self.selections.fetch_add(1, Relaxed);
        } else {
            self.no_admissible.fetch_add(1, Relaxed);
        }
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            outcomes_recorded: self.outcomes_recorded.load(Relaxed),
            failures_skipped: self.failures_skipped.load(Relaxed),
            records_dropped: self.records_dropped.load(Relaxed),
            read_failures: self.read_failures.load(Relaxed),
            selections: self.selections.load(Relaxed),
            no_admissible: self.no_admissible.load(Relaxed),
        }
    }
}
