//! HTTP probing
//!
//! Issues a single GET against a target and turns whatever happens into a
//! `ProbeOutcome` plus the wall-clock latency of the attempt.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::classify::ProbeOutcome;
use crate::error::{MonitorError, Result};

/// Default user agent sent with every probe
pub const DEFAULT_USER_AGENT: &str = concat!("api-monitor/", env!("CARGO_PKG_VERSION"));

/// Result of one probe attempt
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub outcome: ProbeOutcome,
    pub latency: Duration,
}

impl ProbeReport {
    /// Latency in fractional milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Issues probes with one reusable HTTP client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// Create a prober whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::http(format!("Failed to build probe client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET `url` once and read the full body. Never fails: transport errors
    /// become outcomes.
    pub async fn probe(&self, url: &str) -> ProbeReport {
        debug!(url = %url, "Probing endpoint");

        let start = Instant::now();
        let result = match self.client.get(url).send().await {
            // The body read stays under the client timeout
            Ok(response) => {
                let status = response.status().as_u16();
                response.bytes().await.map(|body| (status, body.len()))
            }
            Err(err) => Err(err),
        };
        let latency = start.elapsed();

        let outcome = match result {
            Ok((status, bytes)) => {
                debug!(url = %url, status, bytes, "Probe response received");
                outcome_for_status(status)
            }
            Err(err) => {
                let message = describe_transport_error(&err);
                debug!(url = %url, error = %message, "Probe failed");
                ProbeOutcome::error(message)
            }
        };

        ProbeReport { outcome, latency }
    }
}

/// Map a received status to an outcome.
///
/// Anything below 400 counts as up, matching a client that follows redirects
/// and only raises on 4xx/5xx.
pub fn outcome_for_status(status: u16) -> ProbeOutcome {
    match status {
        0..=399 => ProbeOutcome::success(),
        400..=599 => ProbeOutcome::status(status),
        _ => ProbeOutcome::status_with_error(status, format!("unexpected status {}", status)),
    }
}

/// Describe a reqwest failure so that its kind survives as text.
///
/// The prefix carries the error kind (`timeout`, `connection error`) and the
/// rest is the full source chain. The target URL is masked so words in a
/// path cannot be mistaken for the error kind.
pub fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection error"
    } else {
        "request failed"
    };

    let mut chain = error_chain(err);
    if let Some(url) = err.url() {
        chain = chain.replace(url.as_str(), "<target>");
    }

    format!("{}: {}", kind, chain)
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_for_status() {
        assert!(outcome_for_status(200).succeeded);
        assert!(outcome_for_status(304).succeeded);
        assert_eq!(outcome_for_status(404), ProbeOutcome::status(404));
        assert_eq!(outcome_for_status(503), ProbeOutcome::status(503));

        let odd = outcome_for_status(600);
        assert!(!odd.succeeded);
        assert_eq!(odd.http_status, Some(600));
    }

    #[test]
    fn test_latency_ms() {
        let report = ProbeReport {
            outcome: ProbeOutcome::success(),
            latency: Duration::from_micros(1500),
        };
        assert!((report.latency_ms() - 1.5).abs() < 1e-9);
    }
}
