//! Admission filter
//!
//! A deployment is admissible for the current minute when its usage in that
//! minute is strictly below every configured limit. Reaching a limit already
//! excludes it. Missing statistics never exclude anything.

use super::deployment::Deployment;
use super::types::GroupLatencyMap;
use crate::utils::time::minute_bucket;
use chrono::{DateTime, Utc};

/// Whether `deployment` may take another request in the minute of `now`
pub fn is_admissible(
    deployment: &Deployment,
    group_map: Option<&GroupLatencyMap>,
    now: DateTime<Utc>,
) -> bool {
    let Some(stats) = group_map.and_then(|map| map.get(&deployment.id)) else {
        return true;
    };

    let bucket = minute_bucket(now);
    let requests_now = stats.requests_in(&bucket);
    let tokens_now = stats.tokens_in(&bucket);

    let rpm_ok = match deployment.rpm {
        Some(limit) => requests_now < limit,
        None => true,
    };

    let tpm_ok = match deployment.tpm {
        Some(limit) => tokens_now < limit,
        None => true,
    };

    rpm_ok && tpm_ok
}

/// Admissible candidates, in their original order
pub fn filter_admissible<'a>(
    candidates: &'a [Deployment],
    group_map: Option<&GroupLatencyMap>,
    now: DateTime<Utc>,
) -> Vec<&'a Deployment> {
    candidates
        .iter()
        .filter(|d| is_admissible(d, group_map, now))
        .collect()
}
