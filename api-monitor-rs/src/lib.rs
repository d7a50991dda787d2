//! # API Monitor
//!
//! A small synthetic-monitoring probe. It GETs a fixed list of endpoints on
//! an interval, classifies each outcome and writes one health observation per
//! probe to InfluxDB.
//!
//! ## Architecture
//!
//! - `classify`: pure mapping from a `ProbeOutcome` to a `Classification`
//! - `probe`: one HTTP GET with a timeout, measured
//! - `recorder`: the `Recorder` trait, the InfluxDB sink and an in-memory sink
//! - `monitor`: the sequential probe loop
//! - `config` / `logging` / `error`: ambient plumbing

pub mod classify;
pub use classify::{classify, Category, Classification, ProbeOutcome};

pub mod probe;
pub use probe::{HttpProber, ProbeReport};

pub mod recorder;
pub use recorder::{HealthObservation, InfluxRecorder, MemoryRecorder, Recorder};

pub mod monitor;
pub use monitor::{EndpointResult, Monitor, RunSummary};

pub mod config;
pub use config::{AppConfig, EndpointConfig, MonitorConfig, SinkConfig};

pub mod error;
pub use error::{MonitorError, Result, WriteError};

pub mod logging;

#[cfg(test)]
mod tests;
