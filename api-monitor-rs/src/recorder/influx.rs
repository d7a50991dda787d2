//! InfluxDB v2 recorder
//!
//! Holds the one sink connection the process uses. The client is built once
//! in `connect`, carries the auth token as a default header, and is reused
//! for every write until `close`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info};

use super::{HealthObservation, Recorder};
use crate::config::SinkConfig;
use crate::error::{MonitorError, Result, WriteError};

/// Recorder writing line protocol to `/api/v2/write`
#[derive(Debug)]
pub struct InfluxRecorder {
    client: Client,
    write_url: String,
    config: SinkConfig,
    writes: AtomicU64,
}

impl InfluxRecorder {
    /// Open the sink handle. No request is made until the first write.
    pub fn connect(config: SinkConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Token {}", config.token))
            .map_err(|e| MonitorError::configuration(format!("Invalid sink token: {}", e)))?;
        headers.insert(AUTHORIZATION, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MonitorError::http(format!("Failed to build sink client: {}", e)))?;

        let write_url = format!("{}/api/v2/write", config.url.trim_end_matches('/'));

        info!(
            url = %config.url,
            org = %config.org,
            bucket = %config.bucket,
            measurement = %config.measurement,
            "Opened InfluxDB sink"
        );

        Ok(Self {
            client,
            write_url,
            config,
            writes: AtomicU64::new(0),
        })
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Release the sink handle
    pub fn close(self) {
        info!(writes = self.writes(), bucket = %self.config.bucket, "Closed InfluxDB sink");
    }
}

#[async_trait]
impl Recorder for InfluxRecorder {
    async fn record(&self, observation: &HealthObservation) -> std::result::Result<(), WriteError> {
        let line = observation
            .to_point(&self.config.measurement)?
            .to_line_protocol()?;

        debug!(line = %line, "Writing observation");

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .body(line)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WriteError::from_status(status.as_u16(), &body));
        }

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
