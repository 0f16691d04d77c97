//! Lowest-latency deployment selection
//!
//! # Flow
//!
//! 1. Read the group's snapshot from the store
//! 2. Drop candidates that are at or over a limit this minute
//! 3. Score each remaining candidate by its average latency; candidates without
//!    samples score below any real latency so they get exercised
//! 4. Pick the lowest score, first candidate wins ties
//!
//! With a non-zero `lowest_latency_buffer`, step 4 instead picks at random among
//! the candidates whose average is within `best * (1 + buffer)`.

use super::admission::filter_admissible;
use super::deployment::Deployment;
use super::store::WindowedStatStore;
use super::types::GroupLatencyMap;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

/// Score of a deployment with no latency samples
pub const COLD_START_SCORE: f64 = f64::NEG_INFINITY;

/// Average latency of `deployment_id`, or [`COLD_START_SCORE`] without samples
pub fn latency_score(group_map: Option<&GroupLatencyMap>, deployment_id: &str) -> f64 {
    group_map
        .and_then(|map| map.get(deployment_id))
        .and_then(|stats| stats.average_latency())
        .unwrap_or(COLD_START_SCORE)
}

/// Pick the lowest-latency deployment among already admitted candidates
pub fn lowest_latency<'a>(
    admissible: &[&'a Deployment],
    group_map: Option<&GroupLatencyMap>,
    lowest_latency_buffer: f64,
) -> Option<&'a Deployment> {
    let scored: Vec<(&'a Deployment, f64)> = admissible
        .iter()
        .map(|d| (*d, latency_score(group_map, &d.id)))
        .collect();

    let mut best: Option<(&'a Deployment, f64)> = None;
    for &(deployment, score) in &scored {
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((deployment, score)),
        }
    }
    let (winner, best_score) = best?;

    if lowest_latency_buffer <= 0.0 || !best_score.is_finite() {
        return Some(winner);
    }

    let threshold = best_score * (1.0 + lowest_latency_buffer);
    let within: Vec<&'a Deployment> = scored
        .iter()
        .filter(|(_, score)| *score <= threshold)
        .map(|(deployment, _)| *deployment)
        .collect();

    if within.len() <= 1 {
        return Some(winner);
    }
    let index = rand::thread_rng().gen_range(0..within.len());
    Some(within[index])
}

/// Selects the admissible deployment with the lowest observed latency
#[derive(Clone)]
pub struct LatencySelector {
    store: WindowedStatStore,
    lowest_latency_buffer: f64,
}

impl LatencySelector {
    pub fn new(store: WindowedStatStore, lowest_latency_buffer: f64) -> Self {
        Self {
            store,
            lowest_latency_buffer,
        }
    }

    /// Choose a deployment for `group`, or `None` when every candidate is saturated
    pub async fn select(
        &self,
        group: &str,
        candidates: &[Deployment],
        now: DateTime<Utc>,
    ) -> Option<Deployment> {
        let group_map = self.store.read(group).await;
        Self::select_from_snapshot(candidates, group_map.as_ref(), now, self.lowest_latency_buffer)
    }

    /// Selection over an already-read snapshot
    pub fn select_from_snapshot(
        candidates: &[Deployment],
        group_map: Option<&GroupLatencyMap>,
        now: DateTime<Utc>,
        lowest_latency_buffer: f64,
    ) -> Option<Deployment> {
        let admissible = filter_admissible(candidates, group_map, now);
        if admissible.is_empty() {
            debug!(
                candidates = candidates.len(),
                "No deployment currently admits load"
            );
            return None;
        }

        let winner = lowest_latency(&admissible, group_map, lowest_latency_buffer)?;
        debug!(
            deployment = %winner.id,
            admissible = admissible.len(),
            candidates = candidates.len(),
            score = latency_score(group_map, &winner.id),
            "Selected lowest latency deployment"
        );
        Some(winner.clone())
    }
}
