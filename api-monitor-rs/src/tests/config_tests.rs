//! Tests for configuration loading
//!
//! Environment-based tests use a unique prefix each so they can run in
//! parallel without clobbering each other.

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;
    use std::time::Duration;

    use crate::config::{
        parse_endpoints, AppConfig, ConfigProviderExt, EndpointConfig, EnvConfigProvider, MemoryConfigProvider,
        MonitorConfig, SinkConfig,
    };
    use crate::error::MonitorError;

    fn sink_provider() -> MemoryConfigProvider {
        let mut provider = MemoryConfigProvider::new();
        provider.set("influxdb_url", "http://localhost:8086");
        provider.set("influxdb_token", "test-token");
        provider.set("influxdb_org", "ops");
        provider.set("influxdb_bucket", "api_health");
        provider
    }

    #[test]
    fn test_sink_config_from_provider() {
        let config = SinkConfig::from_provider(&sink_provider()).unwrap();
        assert_eq!(config.url, "http://localhost:8086");
        assert_eq!(config.token, "test-token");
        assert_eq!(config.org, "ops");
        assert_eq!(config.bucket, "api_health");
        assert_eq!(config.measurement, "api_health");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_sink_value_fails_fast() {
        for key in ["influxdb_url", "influxdb_token", "influxdb_org", "influxdb_bucket"] {
            let mut provider = sink_provider();
            provider.set(key, "  ");

            match SinkConfig::from_provider(&provider) {
                Err(MonitorError::Configuration(message)) => {
                    assert!(message.contains(&key.to_uppercase()), "{}", message)
                }
                other => panic!("expected configuration error for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_sink_url_must_be_http() {
        let mut provider = sink_provider();
        provider.set("influxdb_url", "ftp://localhost");
        assert!(SinkConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let mut provider = sink_provider();
        provider.set("monitor_interval_secs", "ten");
        assert!(MonitorConfig::from_provider(&provider).is_err());
        assert!(provider.get_u64_or("monitor_interval_secs", 10).is_err());
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::from_provider(&MemoryConfigProvider::new()).unwrap();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.endpoints[0], EndpointConfig::new("Product_Catalog", "https://api.github.com"));
        assert_eq!(
            config.endpoints[1],
            EndpointConfig::new("Checkout_Service", "https://httpbin.org/status/500")
        );
    }

    #[test]
    fn test_parse_endpoints() {
        let endpoints = parse_endpoints(" Catalog=https://a.example/health , Checkout=http://b.example/?x=1 ,").unwrap();
        assert_eq!(
            endpoints,
            vec![
                EndpointConfig::new("Catalog", "https://a.example/health"),
                EndpointConfig::new("Checkout", "http://b.example/?x=1"),
            ]
        );

        assert!(parse_endpoints("no-equals-sign").is_err());
    }

    #[test]
    fn test_duplicate_and_invalid_endpoints_rejected() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("monitor_endpoints", "A=http://a.example,A=http://b.example");
        assert!(MonitorConfig::from_provider(&provider).is_err());

        provider.set("monitor_endpoints", "A=not a url");
        assert!(MonitorConfig::from_provider(&provider).is_err());

        provider.set("monitor_endpoints", ",");
        assert!(MonitorConfig::from_provider(&provider).is_err());

        provider.set("monitor_endpoints", "A=http://a.example");
        provider.set("monitor_timeout_secs", "0");
        assert!(MonitorConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_endpoints_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[endpoints]]
name = "Product_Catalog"
url = "https://api.github.com"

[[endpoints]]
name = "Search"
url = "http://search.internal:8080/health"
"#
        )
        .unwrap();

        let mut provider = MemoryConfigProvider::new();
        provider.set("monitor_endpoints_file", file.path().display());
        provider.set("monitor_endpoints", "Ignored=http://ignored.example");

        let config = MonitorConfig::from_provider(&provider).unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[1].name, "Search");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("monitor_interval_secs", "0");

        match MonitorConfig::from_provider(&provider) {
            Err(MonitorError::Configuration(msg)) => assert!(msg.contains("MONITOR_INTERVAL_SECS")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_name_with_line_break_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[endpoints]]
name = "Product\nCatalog"
url = "https://api.github.com"
"#
        )
        .unwrap();

        let mut provider = MemoryConfigProvider::new();
        provider.set("monitor_endpoints_file", file.path().display());

        match MonitorConfig::from_provider(&provider) {
            Err(MonitorError::Configuration(msg)) => assert!(msg.contains("control characters")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_endpoints_file() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("monitor_endpoints_file", "/nonexistent/api-monitor/endpoints.toml");
        assert!(matches!(MonitorConfig::from_provider(&provider), Err(MonitorError::Io(_))));
    }

    #[test]
    fn test_app_config_from_env() {
        env::set_var("APIMON_CFG_INFLUXDB_URL", "http://influx.internal:8086");
        env::set_var("APIMON_CFG_INFLUXDB_TOKEN", "env-token");
        env::set_var("APIMON_CFG_INFLUXDB_ORG", "ops");
        env::set_var("APIMON_CFG_INFLUXDB_BUCKET", "health");
        env::set_var("APIMON_CFG_MONITOR_INTERVAL_SECS", "30");
        env::set_var("APIMON_CFG_MONITOR_ENDPOINTS", "Status=https://status.example/");

        let provider = EnvConfigProvider::new().with_prefix("APIMON_CFG");
        let config = AppConfig::from_provider(&provider).unwrap();

        assert_eq!(config.sink.url, "http://influx.internal:8086");
        assert_eq!(config.sink.bucket, "health");
        assert_eq!(config.monitor.interval, Duration::from_secs(30));
        assert_eq!(config.monitor.endpoints, vec![EndpointConfig::new("Status", "https://status.example/")]);
    }

    #[test]
    fn test_app_config_missing_env() {
        env::remove_var("APIMON_MISSING_INFLUXDB_URL");
        let provider = EnvConfigProvider::new().with_prefix("APIMON_MISSING");
        assert!(matches!(
            AppConfig::from_provider(&provider),
            Err(MonitorError::Configuration(_))
        ));
    }
}
