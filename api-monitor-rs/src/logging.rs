//! # Structured Logging
//!
//! Installs the global tracing subscriber. `RUST_LOG` wins when set,
//! otherwise `LOG_LEVEL` (default `info`) is used. `LOG_FORMAT=json` switches
//! to one JSON object per line.
//!
//! Logs go to stderr so the operator console on stdout stays readable.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::{ConfigProvider, ConfigProviderExt};
use crate::error::{MonitorError, Result};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON instead of text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Self {
        Self {
            level: provider.get_string_or("log_level", "info"),
            json_format: provider.get_string_or("log_format", "text").eq_ignore_ascii_case("json"),
        }
    }
}

/// Initialize logging once; later calls are no-ops
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MonitorError::logging(format!("Invalid log filter {}: {}", config.level, e)))?;

    let registry = Registry::default().with(filter);

    let installed = if config.json_format {
        let layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_writer(std::io::stderr);
        tracing::subscriber::set_global_default(registry.with(layer))
    } else {
        let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
        tracing::subscriber::set_global_default(registry.with(layer))
    };
    installed.map_err(|e| MonitorError::logging(format!("Failed to set global subscriber: {}", e)))?;

    LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

    tracing::debug!(level = %config.level, json = config.json_format, "Logging initialized");
    Ok(())
}
