//! Test fixtures and data factories
//!
//! All factories create real objects, not mocks.

use chrono::{DateTime, Duration, TimeZone, Utc};
use latency_router::{CallOutcome, Clock, Deployment, LatencyRouter, LatencyRoutingConfig, ManualClock};
use std::sync::Arc;

/// Default model group used across the suite
pub const GROUP: &str = "gpt-3.5-turbo";

/// Factory for deployment rosters
pub struct DeploymentFactory;

impl DeploymentFactory {
    /// Deployment of [`GROUP`] without limits
    pub fn create(id: &str) -> Deployment {
        Deployment::new(id, GROUP)
            .with_model(format!("azure/{}", id))
            .with_api_base(format!("https://{}.openai.azure.com", id))
    }

    /// Deployment of [`GROUP`] with a requests-per-minute limit
    pub fn with_rpm(id: &str, rpm: u64) -> Deployment {
        Self::create(id).with_rpm(rpm)
    }

    /// Deployment of [`GROUP`] with a tokens-per-minute limit
    pub fn with_tpm(id: &str, tpm: u64) -> Deployment {
        Self::create(id).with_tpm(tpm)
    }
}

/// Factory for call outcomes
pub struct OutcomeFactory;

impl OutcomeFactory {
    /// Successful call of `secs` seconds ending at `end`
    pub fn success_at(end: DateTime<Utc>, id: &str, secs: f64, tokens: i64) -> CallOutcome {
        let start = end - Duration::milliseconds((secs * 1000.0) as i64);
        CallOutcome::success(GROUP, id, start, end, tokens)
    }

    /// Failed call of `secs` seconds ending at `end`
    pub fn failure_at(end: DateTime<Utc>, id: &str, secs: f64) -> CallOutcome {
        let start = end - Duration::milliseconds((secs * 1000.0) as i64);
        CallOutcome::failure(GROUP, id, start, end)
    }
}

/// In-memory router driven by a manual clock
pub struct TestRouter {
    pub router: LatencyRouter,
    pub clock: Arc<ManualClock>,
}

impl TestRouter {
    /// Router at 2024-03-01 12:00:15 UTC
    pub fn new(config: LatencyRoutingConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 15).unwrap(),
        ));
        let router = LatencyRouter::with_clock(config, clock.clone());
        Self { router, clock }
    }

    /// Report a successful call finishing now
    pub async fn succeed(&self, id: &str, secs: f64, tokens: i64) {
        let outcome = OutcomeFactory::success_at(self.clock.now(), id, secs, tokens);
        self.router.report_outcome(&outcome).await;
    }

    /// Chosen deployment id, if any
    pub async fn choose(&self, candidates: &[Deployment]) -> Option<String> {
        self.router
            .choose_deployment(GROUP, candidates)
            .await
            .map(|d| d.id)
    }
}
