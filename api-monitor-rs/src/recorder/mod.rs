//! Observation recording
//!
//! A `Recorder` persists one `HealthObservation` per probe attempt. The
//! production implementation writes InfluxDB line protocol over HTTP; the
//! in-memory one backs tests and dry runs.

pub mod influx;
pub mod memory;
pub mod point;

pub use influx::InfluxRecorder;
pub use memory::MemoryRecorder;
pub use point::Point;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::classify::Classification;
use crate::error::WriteError;

/// Default measurement name for health records
pub const DEFAULT_MEASUREMENT: &str = "api_health";

/// One persisted health record
#[derive(Debug, Clone, PartialEq)]
pub struct HealthObservation {
    /// Endpoint name (tag)
    pub endpoint: String,
    /// Category tag value
    pub category: String,
    /// Detail tag value
    pub detail: String,
    /// 1 when up, 0 otherwise
    pub status: i64,
    /// Probe duration in milliseconds
    pub latency_ms: f64,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl HealthObservation {
    /// Build an observation stamped with the current time
    pub fn new(endpoint: impl Into<String>, classification: &Classification, latency_ms: f64) -> Self {
        Self::at(endpoint, classification, latency_ms, Utc::now())
    }

    /// Build an observation with an explicit capture time
    pub fn at(
        endpoint: impl Into<String>,
        classification: &Classification,
        latency_ms: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            category: classification.category.as_str().to_string(),
            detail: classification.detail.clone(),
            status: if classification.is_success() { 1 } else { 0 },
            latency_ms,
            timestamp,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == 1
    }

    /// Encode into a point for the given measurement
    pub fn to_point(&self, measurement: &str) -> Result<Point, WriteError> {
        let nanos = self
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| WriteError::MalformedPoint(format!("timestamp out of range: {}", self.timestamp)))?;

        Ok(Point::new(measurement)
            .tag("endpoint", &self.endpoint)
            .tag("category", &self.category)
            .tag("detail", &self.detail)
            .field_int("status", self.status)
            .field_float("latency", self.latency_ms)
            .timestamp(nanos))
    }
}

/// Sink for health observations
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Persist one observation. No retry is attempted.
    async fn record(&self, observation: &HealthObservation) -> Result<(), WriteError>;
}
