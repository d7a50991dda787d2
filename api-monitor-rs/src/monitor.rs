//! Probe loop
//!
//! Each cycle probes every configured endpoint one at a time, in declared
//! order, classifies the outcome and hands one observation to the recorder.
//! A failure on one endpoint (probe or write) never stops the cycle. Between
//! cycles the monitor sleeps for the configured interval, measured from the
//! end of the previous cycle.

use std::future::Future;

use chrono::Local;
use tracing::{info, warn};

use crate::classify::{classify, Classification};
use crate::config::{EndpointConfig, MonitorConfig};
use crate::error::{Result, WriteError};
use crate::probe::HttpProber;
use crate::recorder::{HealthObservation, Recorder};

/// What happened to one endpoint in one cycle
#[derive(Debug, Clone)]
pub struct EndpointResult {
    pub observation: HealthObservation,
    pub classification: Classification,
    /// Set when the recorder refused the observation
    pub write_error: Option<WriteError>,
}

impl EndpointResult {
    /// Operator-facing console line
    pub fn console_line(&self) -> String {
        let name = format!("{:<18}", self.observation.endpoint);
        if self.classification.is_success() {
            format!("  ✅ {}: UP (Latency: {:.2}ms)", name, self.observation.latency_ms)
        } else {
            format!(
                "  ❌ {}: {} ({})",
                name,
                self.classification.category.label(),
                self.classification.detail
            )
        }
    }
}

/// Totals for a `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that ran to completion
    pub cycles: u64,
    pub observations: u64,
    pub write_failures: u64,
}

/// Drives probe → classify → record over a fixed endpoint list
pub struct Monitor<R: Recorder> {
    config: MonitorConfig,
    prober: HttpProber,
    recorder: R,
}

impl<R: Recorder> Monitor<R> {
    pub fn new(config: MonitorConfig, recorder: R) -> Result<Self> {
        config.validate()?;
        let prober = HttpProber::new(config.probe_timeout)?;
        Ok(Self {
            config,
            prober,
            recorder,
        })
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Give back the recorder so the caller can release it
    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// Probe, classify and record a single endpoint
    pub async fn check_endpoint(&self, endpoint: &EndpointConfig) -> EndpointResult {
        let report = self.prober.probe(&endpoint.url).await;
        let classification = classify(&report.outcome);
        let observation = HealthObservation::new(&endpoint.name, &classification, report.latency_ms());

        let write_error = match self.recorder.record(&observation).await {
            Ok(()) => None,
            Err(e) => {
                warn!(endpoint = %endpoint.name, error = %e, "Failed to record observation");
                Some(e)
            }
        };

        info!(
            endpoint = %endpoint.name,
            category = %classification.category,
            detail = %classification.detail,
            latency_ms = observation.latency_ms,
            "Endpoint checked"
        );

        EndpointResult {
            observation,
            classification,
            write_error,
        }
    }

    /// Run one full cycle over every endpoint, printing one line each
    pub async fn run_cycle(&self) -> Vec<EndpointResult> {
        println!(
            "\n🚀 [{}] Smart Monitoring Loop Started...",
            Local::now().format("%H:%M:%S")
        );

        let mut results = Vec::with_capacity(self.config.endpoints.len());
        for endpoint in &self.config.endpoints {
            let result = self.check_endpoint(endpoint).await;
            println!("{}", result.console_line());
            results.push(result);
        }
        results
    }

    /// Run one cycle unless `shutdown` resolves first; `None` when interrupted
    pub async fn run_once<F>(&self, shutdown: F) -> Option<Vec<EndpointResult>>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            results = self.run_cycle() => Some(results),
            _ = shutdown => None,
        }
    }

    /// Loop until `shutdown` resolves.
    ///
    /// The shutdown future is raced against both the cycle and the sleep,
    /// so an interrupt cuts short an in-flight probe and leaves the rest of
    /// that cycle unprobed.
    pub async fn run<F>(&self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        info!(
            endpoints = self.config.endpoints.len(),
            interval_secs = self.config.interval.as_secs(),
            timeout_secs = self.config.probe_timeout.as_secs(),
            "Monitor started"
        );

        loop {
            let results = tokio::select! {
                results = self.run_cycle() => results,
                _ = &mut shutdown => break,
            };

            summary.cycles += 1;
            summary.observations += results.len() as u64;
            summary.write_failures += results.iter().filter(|r| r.write_error.is_some()).count() as u64;

            println!(
                "  💤 Waiting {} seconds for next check...",
                self.config.interval.as_secs()
            );

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = &mut shutdown => break,
            }
        }

        info!(
            cycles = summary.cycles,
            observations = summary.observations,
            write_failures = summary.write_failures,
            "Monitor stopped"
        );
        summary
    }
}
