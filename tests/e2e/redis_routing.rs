//! Shared-statistics routing through Redis

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{DeploymentFactory, GROUP, OutcomeFactory};
    use crate::skip_without_env;
    use latency_router::{LatencyRouter, LatencyRoutingConfig, RedisStatsCache, SystemClock};
    use chrono::Utc;
    use std::sync::Arc;

    async fn router(url: &str, group_suffix: &str) -> (LatencyRouter, String) {
        let cache = RedisStatsCache::connect(url).await.unwrap();
        let router = LatencyRouter::new(
            Arc::new(cache),
            LatencyRoutingConfig::new(5, 30),
            Arc::new(SystemClock),
        );
        (router, format!("{}-{}", GROUP, group_suffix))
    }

    /// Two router instances over one Redis see each other's statistics
    #[tokio::test]
    #[ignore]
    async fn test_routers_share_statistics() {
        skip_without_env!("REDIS_URL");
        let url = std::env::var("REDIS_URL").unwrap();
        let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string();

        let (first, group) = router(&url, &suffix).await;
        let (second, _) = router(&url, &suffix).await;

        let mut slow = OutcomeFactory::success_at(Utc::now(), "x", 3.0, 10);
        slow.group = group.clone();
        let mut fast = OutcomeFactory::success_at(Utc::now(), "y", 1.0, 10);
        fast.group = group.clone();
        first.report_outcome(&slow).await;
        first.report_outcome(&fast).await;

        let candidates = vec![DeploymentFactory::create("x"), DeploymentFactory::create("y")];
        let chosen = second.choose_deployment(&group, &candidates).await;
        assert_eq!(chosen.map(|d| d.id), Some("y".to_string()));

        let stats = second.group_stats(&group).await.unwrap();
        assert_eq!(stats.get("x").unwrap().latencies, vec![3.0]);
    }
}
