//! Configuration integration tests
//!
//! Loading from files, validation failures, and building a router from
//! configuration.

#[cfg(test)]
mod tests {
    use latency_router::{CacheBackendConfig, Config, LatencyRouter, RouterError};
    use std::io::Write;

    const ROUTER_YAML: &str = r#"
routing:
  latency_window_cap: 4
  stats_ttl_seconds: 120
cache:
  type: in_memory
logging:
  level: debug
deployments:
  - id: azure-france
    model_name: gpt-3.5-turbo
    model: azure/chatgpt-v-2
    api_base: https://france.openai.azure.com
    rpm: 1440
  - id: azure-europe
    model_name: gpt-3.5-turbo
    model: azure/chatgpt-v-2
    rpm: 6
  - id: anthropic
    model_name: claude
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml_str(ROUTER_YAML).unwrap();

        assert_eq!(config.routing.latency_window_cap, 4);
        assert_eq!(config.routing.stats_ttl_seconds, 120);
        assert_eq!(config.routing.lowest_latency_buffer, 0.0);
        assert_eq!(config.cache, CacheBackendConfig::InMemory);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.deployments.len(), 3);
    }

    #[test]
    fn test_deployments_for_group_keep_order() {
        let config = Config::from_yaml_str(ROUTER_YAML).unwrap();
        let ids: Vec<String> = config
            .deployments_for("gpt-3.5-turbo")
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["azure-france", "azure-europe"]);
        assert!(config.deployments_for("unknown").is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.routing.latency_window_cap, 10);
        assert_eq!(config.routing.stats_ttl_seconds, 60);
    }

    #[test]
    fn test_zero_window_cap_rejected() {
        let err = Config::from_yaml_str("routing:\n  latency_window_cap: 0\n").unwrap_err();
        assert!(matches!(err, RouterError::Config(_)));
        assert!(err.to_string().contains("window cap"));
    }

    #[test]
    fn test_negative_buffer_rejected() {
        let result = Config::from_yaml_str("routing:\n  lowest_latency_buffer: -0.5\n");
        assert!(matches!(result, Err(RouterError::Config(_))));
    }

    #[test]
    fn test_duplicate_deployment_ids_rejected() {
        let yaml = r#"
deployments:
  - id: a
    model_name: gpt-4
  - id: a
    model_name: gpt-4
"#;
        let err = Config::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate deployment id"));
    }

    #[test]
    fn test_bad_redis_url_rejected() {
        let yaml = "cache:\n  type: redis\n  url: http://localhost:6379\n";
        assert!(Config::from_yaml_str(yaml).is_err());
    }

    #[tokio::test]
    async fn test_from_file_builds_router() {
        let file = write_config(ROUTER_YAML);
        let config = Config::from_file(file.path()).await.unwrap();

        let router = LatencyRouter::from_config(&config).await.unwrap();
        assert_eq!(router.config().latency_window_cap, 4);

        let deployments = config.deployments_for("gpt-3.5-turbo");
        let chosen = router.choose_deployment("gpt-3.5-turbo", &deployments).await;
        assert_eq!(chosen.map(|d| d.id), Some("azure-france".to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let result = Config::from_file("/nonexistent/router.yaml").await;
        assert!(matches!(result, Err(RouterError::Config(_))));
    }
}
