//! api-monitor binary
//!
//! Loads `.env`, validates configuration, opens the InfluxDB sink and runs
//! the probe loop until Ctrl-C. `--once` runs a single cycle and exits.

use std::process::ExitCode;

use api_monitor::config::EnvConfigProvider;
use api_monitor::logging::{init_logging, LoggingConfig};
use api_monitor::{AppConfig, InfluxRecorder, Monitor};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "api-monitor failed");
            eprintln!("api-monitor: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> api_monitor::Result<()> {
    let provider = EnvConfigProvider::new();
    init_logging(LoggingConfig::from_provider(&provider))?;

    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let config = AppConfig::from_provider(&provider)?;
    info!(
        sink = %config.sink.url,
        endpoints = config.monitor.endpoints.len(),
        "Configuration loaded"
    );

    let recorder = InfluxRecorder::connect(config.sink)?;
    let monitor = Monitor::new(config.monitor, recorder)?;

    if once {
        match monitor.run_once(shutdown_signal()).await {
            Some(results) => {
                let failures = results.iter().filter(|r| r.write_error.is_some()).count();
                info!(observations = results.len(), write_failures = failures, "Single cycle complete");
            }
            None => println!("\n🛑 Monitor stopped by user."),
        }
    } else {
        monitor.run(shutdown_signal()).await;
        println!("\n🛑 Monitor stopped by user.");
    }

    monitor.into_recorder().close();
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
