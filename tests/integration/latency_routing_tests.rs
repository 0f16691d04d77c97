//! Latency routing integration tests
//!
//! End-to-end routing flows: record outcomes, then choose.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{DeploymentFactory, GROUP, OutcomeFactory, TestRouter};
    use latency_router::{Clock, LatencyRoutingConfig};
    use std::time::Duration;

    // ==================== Latency ranking ====================

    /// The faster of two measured deployments is chosen
    #[tokio::test]
    async fn test_lowest_latency_deployment_chosen() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("y")];

        t.succeed("x", 3.0, 50).await;
        t.succeed("y", 2.0, 50).await;

        assert_eq!(t.choose(&candidates).await, Some("y".to_string()));
    }

    /// Ranking follows the average over the window, not the last sample
    #[tokio::test]
    async fn test_ranking_uses_window_average() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("y")];

        // x: avg 1.0, last 0.2; y: avg 0.8, last 1.4
        for secs in [1.8, 1.0, 0.2] {
            t.succeed("x", secs, 1).await;
        }
        for secs in [0.2, 0.8, 1.4] {
            t.succeed("y", secs, 1).await;
        }

        assert_eq!(t.choose(&candidates).await, Some("y".to_string()));
    }

    /// Old samples leave the window and stop influencing the ranking
    #[tokio::test]
    async fn test_recovered_deployment_regains_traffic() {
        let t = TestRouter::new(LatencyRoutingConfig::new(3, 60));
        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("y")];

        for _ in 0..3 {
            t.succeed("x", 5.0, 1).await;
            t.succeed("y", 1.0, 1).await;
        }
        assert_eq!(t.choose(&candidates).await, Some("y".to_string()));

        for _ in 0..3 {
            t.succeed("x", 0.5, 1).await;
        }
        assert_eq!(t.choose(&candidates).await, Some("x".to_string()));
    }

    /// A new deployment is tried before any measured one
    #[tokio::test]
    async fn test_new_deployment_is_explored() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        t.succeed("x", 0.05, 1).await;

        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("new")];
        assert_eq!(t.choose(&candidates).await, Some("new".to_string()));
    }

    /// Failed calls leave no trace in the statistics
    #[tokio::test]
    async fn test_failures_do_not_affect_ranking() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("y")];

        t.succeed("x", 1.0, 1).await;
        t.succeed("y", 2.0, 1).await;
        for _ in 0..5 {
            let failure = OutcomeFactory::failure_at(t.clock.now(), "x", 30.0);
            t.router.report_outcome(&failure).await;
        }

        assert_eq!(t.choose(&candidates).await, Some("x".to_string()));
        let stats = t.router.group_stats(GROUP).await.unwrap();
        assert_eq!(stats.get("x").unwrap().latencies, vec![1.0]);
    }

    // ==================== Usage limits ====================

    /// rpm 1 is saturated after one call, rpm 3 after three
    #[tokio::test]
    async fn test_rpm_limits() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![
            DeploymentFactory::with_rpm("x", 1),
            DeploymentFactory::with_rpm("y", 3),
        ];

        t.succeed("x", 0.1, 1).await;
        assert_eq!(t.choose(&candidates).await, Some("y".to_string()));

        for _ in 0..3 {
            t.succeed("y", 0.1, 1).await;
        }
        assert_eq!(t.choose(&candidates).await, None);
    }

    /// Token usage at the tpm limit excludes the deployment
    #[tokio::test]
    async fn test_tpm_limits() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![
            DeploymentFactory::with_tpm("x", 1000),
            DeploymentFactory::create("y"),
        ];

        t.succeed("x", 0.1, 999).await;
        t.succeed("y", 2.0, 10).await;
        assert_eq!(t.choose(&candidates).await, Some("x".to_string()));

        t.succeed("x", 0.1, 1).await;
        assert_eq!(t.choose(&candidates).await, Some("y".to_string()));
    }

    /// Usage counts only toward the minute it happened in
    #[tokio::test]
    async fn test_limits_reset_each_minute() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![DeploymentFactory::with_rpm("x", 2)];

        t.succeed("x", 0.1, 1).await;
        t.succeed("x", 0.1, 1).await;
        assert_eq!(t.choose(&candidates).await, None);

        t.clock.advance(Duration::from_secs(45));
        assert_eq!(t.choose(&candidates).await, Some("x".to_string()));
    }

    // ==================== Expiry ====================

    /// Statistics are forgotten once the TTL passes without writes
    #[tokio::test]
    async fn test_statistics_expire() {
        let t = TestRouter::new(LatencyRoutingConfig::new(10, 5));
        t.succeed("x", 0.1, 1).await;

        t.clock.advance(Duration::from_secs(4));
        assert!(t.router.group_stats(GROUP).await.is_some());

        t.clock.advance(Duration::from_secs(1));
        assert!(t.router.group_stats(GROUP).await.is_none());
    }

    // ==================== Metrics ====================

    #[tokio::test]
    async fn test_metrics_snapshot() {
        let t = TestRouter::new(LatencyRoutingConfig::default());
        let candidates = vec![DeploymentFactory::with_rpm("x", 1)];

        t.succeed("x", 0.1, 1).await;
        t.router
            .report_outcome(&OutcomeFactory::failure_at(t.clock.now(), "x", 1.0))
            .await;
        t.choose(&candidates).await;

        let snapshot = t.router.metrics_snapshot();
        assert_eq!(snapshot.outcomes_recorded, 1);
        assert_eq!(snapshot.failures_skipped, 1);
        assert_eq!(snapshot.no_admissible, 1);
        assert_eq!(snapshot.records_dropped, 0);
    }
}
