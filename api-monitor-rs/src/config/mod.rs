//! Configuration management for the monitor
//!
//! Values come from environment variables (optionally seeded from a `.env`
//! file by the binary) through the `ConfigProvider` abstraction, so tests can
//! swap in a `MemoryConfigProvider`. The endpoint list may also be read from a
//! TOML file.
//!
//! Required sink settings are checked at load time so a misconfigured process
//! fails at startup instead of on its first write.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{MonitorError, Result};
use crate::recorder::DEFAULT_MEASUREMENT;

/// Default pause between cycles
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Default per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default sink write timeout
pub const DEFAULT_SINK_TIMEOUT_SECS: u64 = 10;

/// Endpoints probed when nothing else is configured
pub const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("Product_Catalog", "https://api.github.com"),
    ("Checkout_Service", "https://httpbin.org/status/500"),
];

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an optional value, treating absent and blank the same
    fn get_optional(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a required, non-blank value
    fn get_required(&self, key: &str) -> Result<String> {
        self.get_optional(key)
            .ok_or_else(|| MonitorError::configuration(format!("{} is required", key.to_uppercase())))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an unsigned value with a default. A present but invalid value is an error.
    fn get_u64_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.get_optional(key) {
            Some(value) => value.parse::<u64>().map_err(|e| {
                MonitorError::configuration(format!("Invalid integer for {}: {} ({})", key.to_uppercase(), value, e))
            }),
            None => Ok(default),
        }
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));
        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                MonitorError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => {
                MonitorError::configuration(format!("Environment variable is not valid unicode: {}", env_key))
            }
        })
    }
}

/// In-memory config provider for tests or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| MonitorError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Connection settings for the InfluxDB sink
#[derive(Clone)]
pub struct SinkConfig {
    /// Base URL, e.g. `http://localhost:8086`
    pub url: String,
    /// API token
    pub token: String,
    /// Organisation name or ID
    pub org: String,
    /// Target bucket
    pub bucket: String,
    /// Measurement the observations are written to
    pub measurement: String,
    /// Write timeout
    pub timeout: Duration,
}

impl Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("measurement", &self.measurement)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SinkConfig {
    /// Load sink settings. All four connection values are required.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let config = Self {
            url: provider.get_required("influxdb_url")?,
            token: provider.get_required("influxdb_token")?,
            org: provider.get_required("influxdb_org")?,
            bucket: provider.get_required("influxdb_bucket")?,
            measurement: provider.get_string_or("influxdb_measurement", DEFAULT_MEASUREMENT),
            timeout: Duration::from_secs(provider.get_u64_or("influxdb_timeout_secs", DEFAULT_SINK_TIMEOUT_SECS)?),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        parse_http_url(&self.url).map_err(|e| MonitorError::configuration(format!("INFLUXDB_URL: {}", e)))?;

        if self.timeout.is_zero() {
            return Err(MonitorError::configuration("INFLUXDB_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(())
    }
}

/// One monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Human-readable name, used as the `endpoint` tag
    pub name: String,
    /// Fully qualified URL probed with GET
    pub url: String,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EndpointsFile {
    endpoints: Vec<EndpointConfig>,
}

/// Driver settings
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Endpoints probed each cycle, in order
    pub endpoints: Vec<EndpointConfig>,
    /// Pause after each cycle
    pub interval: Duration,
    /// Maximum wait per probe
    pub probe_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl MonitorConfig {
    /// Load driver settings.
    ///
    /// The endpoint list comes from `MONITOR_ENDPOINTS_FILE` if set, else
    /// from `MONITOR_ENDPOINTS` (`Name=url,Name=url`), else the defaults.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let endpoints = if let Some(path) = provider.get_optional("monitor_endpoints_file") {
            load_endpoints_file(Path::new(&path))?
        } else if let Some(list) = provider.get_optional("monitor_endpoints") {
            parse_endpoints(&list)?
        } else {
            default_endpoints()
        };

        let config = Self {
            endpoints,
            interval: Duration::from_secs(provider.get_u64_or("monitor_interval_secs", DEFAULT_INTERVAL_SECS)?),
            probe_timeout: Duration::from_secs(
                provider.get_u64_or("monitor_timeout_secs", DEFAULT_PROBE_TIMEOUT_SECS)?,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(MonitorError::configuration("At least one endpoint must be configured"));
        }

        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if endpoint.name.trim().is_empty() {
                return Err(MonitorError::configuration(format!("Endpoint with URL {} has no name", endpoint.url)));
            }
            if endpoint.name.chars().any(char::is_control) {
                return Err(MonitorError::configuration(format!(
                    "Endpoint name {:?} contains control characters",
                    endpoint.name
                )));
            }
            if !seen.insert(endpoint.name.as_str()) {
                return Err(MonitorError::configuration(format!("Duplicate endpoint name: {}", endpoint.name)));
            }
            parse_http_url(&endpoint.url)
                .map_err(|e| MonitorError::configuration(format!("Endpoint {}: {}", endpoint.name, e)))?;
        }

        if self.interval.is_zero() {
            return Err(MonitorError::configuration("MONITOR_INTERVAL_SECS must be greater than zero"));
        }
        if self.probe_timeout.is_zero() {
            return Err(MonitorError::configuration("MONITOR_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(())
    }
}

/// Full configuration for the binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sink: SinkConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        Ok(Self {
            sink: SinkConfig::from_provider(provider)?,
            monitor: MonitorConfig::from_provider(provider)?,
        })
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&EnvConfigProvider::new())
    }
}

/// The built-in endpoint list
pub fn default_endpoints() -> Vec<EndpointConfig> {
    DEFAULT_ENDPOINTS
        .iter()
        .map(|(name, url)| EndpointConfig::new(*name, *url))
        .collect()
}

/// Parse `Name=url,Name=url`. Whitespace around entries is ignored.
pub fn parse_endpoints(list: &str) -> Result<Vec<EndpointConfig>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| MonitorError::configuration(format!("Endpoint entry must be Name=url: {}", entry)))?;
            Ok(EndpointConfig::new(name.trim(), url.trim()))
        })
        .collect()
}

/// Read endpoints from a TOML file with `[[endpoints]]` tables
pub fn load_endpoints_file(path: &Path) -> Result<Vec<EndpointConfig>> {
    let content = std::fs::read_to_string(path)?;
    let file: EndpointsFile = toml::from_str(&content)
        .map_err(|e| MonitorError::configuration(format!("Invalid endpoints file {}: {}", path.display(), e)))?;
    Ok(file.endpoints)
}

fn parse_http_url(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL {}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme {} in {}", other, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_provider_format_key() {
        let provider = EnvConfigProvider::new().with_prefix("STAGING");
        assert_eq!(provider.format_key("influxdb_url"), "STAGING_INFLUXDB_URL");
        assert_eq!(EnvConfigProvider::new().format_key("monitor-interval"), "MONITOR_INTERVAL");
    }

    #[test]
    fn test_sink_config_debug_hides_token() {
        let config = SinkConfig {
            url: "http://localhost:8086".to_string(),
            token: "super-secret".to_string(),
            org: "ops".to_string(),
            bucket: "health".to_string(),
            measurement: DEFAULT_MEASUREMENT.to_string(),
            timeout: Duration::from_secs(1),
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_default_monitor_config_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
    }
}
