//! Latency routing data model
//!
//! - `LatencyRecord`: one validated completed call
//! - `CallOutcome`: what the dispatch loop reports after a call
//! - `GroupLatencyMap`: per-group snapshot decoded from the statistics cache

use super::deployment::DeploymentId;
use crate::core::cache::{CacheEntry, FieldValue};
use crate::utils::time::elapsed_between;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Outcome of one call, as reported by the dispatch loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Model group the call was made for
    pub group: String,
    /// Deployment that served it
    pub deployment_id: DeploymentId,
    /// Whether the call succeeded
    pub success: bool,
    /// When the call was started
    pub start_time: DateTime<Utc>,
    /// When the call completed
    pub end_time: DateTime<Utc>,
    /// Total tokens consumed (prompt + completion)
    #[serde(default)]
    pub tokens_used: i64,
}

impl CallOutcome {
    /// A successful call
    pub fn success(
        group: impl Into<String>,
        deployment_id: impl Into<DeploymentId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tokens_used: i64,
    ) -> Self {
        Self {
            group: group.into(),
            deployment_id: deployment_id.into(),
            success: true,
            start_time,
            end_time,
            tokens_used,
        }
    }

    /// A failed call
    pub fn failure(
        group: impl Into<String>,
        deployment_id: impl Into<DeploymentId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            group: group.into(),
            deployment_id: deployment_id.into(),
            success: false,
            start_time,
            end_time,
            tokens_used: 0,
        }
    }
}

/// One completed call, normalized for the statistics store
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyRecord {
    pub deployment_id: DeploymentId,
    /// `end - start`, zero when the clock went backwards
    pub duration: Duration,
    pub tokens_used: u64,
    pub observed_at: DateTime<Utc>,
}

impl LatencyRecord {
    /// Build a record, clamping a negative duration and negative token counts to zero
    pub fn new(
        deployment_id: impl Into<DeploymentId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tokens_used: i64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            duration: elapsed_between(start_time, end_time),
            tokens_used: u64::try_from(tokens_used).unwrap_or(0),
            observed_at,
        }
    }
}

/// Windowed statistics of one deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeploymentLatencyStats {
    /// Recent call durations in seconds, oldest first
    pub latencies: Vec<f64>,
    /// Requests per minute bucket
    pub request_counts: BTreeMap<String, u64>,
    /// Tokens per minute bucket
    pub token_counts: BTreeMap<String, u64>,
}

impl DeploymentLatencyStats {
    /// Mean of the retained latencies, `None` when nothing was sampled
    pub fn average_latency(&self) -> Option<f64> {
        if self.latencies.is_empty() {
            return None;
        }
        Some(self.latencies.iter().sum::<f64>() / self.latencies.len() as f64)
    }

    /// Requests admitted in `bucket`
    pub fn requests_in(&self, bucket: &str) -> u64 {
        self.request_counts.get(bucket).copied().unwrap_or(0)
    }

    /// Tokens consumed in `bucket`
    pub fn tokens_in(&self, bucket: &str) -> u64 {
        self.token_counts.get(bucket).copied().unwrap_or(0)
    }
}

/// Snapshot of a model group's statistics, keyed by deployment id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupLatencyMap {
    deployments: HashMap<DeploymentId, DeploymentLatencyStats>,
}

impl GroupLatencyMap {
    /// Decode a raw cache entry; unrecognized fields are ignored
    pub fn from_entry(entry: &CacheEntry) -> Self {
        let mut map = Self::default();

        for (field, value) in entry {
            let Some((deployment_id, stat)) = fields::parse(field) else {
                continue;
            };
            let stats = map
                .deployments
                .entry(deployment_id.to_string())
                .or_default();

            match (stat, value) {
                (fields::StatField::Latency, FieldValue::Samples(samples)) => {
                    stats.latencies = samples.clone();
                }
                (fields::StatField::Requests(bucket), FieldValue::Counter(count)) => {
                    stats
                        .request_counts
                        .insert(bucket.to_string(), non_negative(*count));
                }
                (fields::StatField::Tokens(bucket), FieldValue::Counter(count)) => {
                    stats
                        .token_counts
                        .insert(bucket.to_string(), non_negative(*count));
                }
                _ => {}
            }
        }

        map
    }

    /// Statistics for one deployment
    pub fn get(&self, deployment_id: &str) -> Option<&DeploymentLatencyStats> {
        self.deployments.get(deployment_id)
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Field naming inside a group's cache entry
///
/// - `{deployment}:latency` - sample sequence
/// - `{deployment}:rpm:{bucket}` - request counter
/// - `{deployment}:tpm:{bucket}` - token counter
pub(crate) mod fields {
    const LATENCY: &str = "latency";
    const REQUESTS: &str = "rpm";
    const TOKENS: &str = "tpm";

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum StatField<'a> {
        Latency,
        Requests(&'a str),
        Tokens(&'a str),
    }

    pub(crate) fn latency(deployment_id: &str) -> String {
        format!("{}:{}", deployment_id, LATENCY)
    }

    /// Prefix shared by every request counter of `deployment_id`
    pub(crate) fn requests_prefix(deployment_id: &str) -> String {
        format!("{}:{}:", deployment_id, REQUESTS)
    }

    /// Prefix shared by every token counter of `deployment_id`
    pub(crate) fn tokens_prefix(deployment_id: &str) -> String {
        format!("{}:{}:", deployment_id, TOKENS)
    }

    pub(crate) fn requests(deployment_id: &str, bucket: &str) -> String {
        requests_prefix(deployment_id) + bucket
    }

    pub(crate) fn tokens(deployment_id: &str, bucket: &str) -> String {
        tokens_prefix(deployment_id) + bucket
    }

    /// Split a field name into its deployment id and statistic
    ///
    /// Deployment ids may themselves contain `:`, so parsing works from the right.
    pub(crate) fn parse(field: &str) -> Option<(&str, StatField<'_>)> {
        if let Some(id) = field
            .strip_suffix(LATENCY)
            .and_then(|rest| rest.strip_suffix(':'))
        {
            return Some((id, StatField::Latency));
        }

        let mut parts = field.rsplitn(3, ':');
        let bucket = parts.next()?;
        let kind = parts.next()?;
        let id = parts.next()?;
        match kind {
            REQUESTS => Some((id, StatField::Requests(bucket))),
            TOKENS => Some((id, StatField::Tokens(bucket))),
            _ => None,
        }
    }
}
