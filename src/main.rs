//! Switch connectivity watchdog.
//!
//! # Architecture Overview
//!
//! ```text
//!   timer fires ──▶ probe (current endpoint) ──▶ hub
//!        ▲                 │
//!        │                 ├─ failure: count++, rotate endpoint
//!        │                 ├─ success: count = 0, reconcile ch 0/1 → detached
//!        │                 └─ count ≥ threshold: count = 0, reconcile ch 0/1 → flip
//!        │                                   │
//!        │                                   ▼
//!        │                 device Switch.GetConfig / Switch.SetConfig
//!        │
//!   re-arm ◀── events filter ◀── device NotifyStatus (switch:0, timer, on)
//! ```

use std::path::PathBuf;

use clap::Parser;

use switch_watchdog::config::{load_config, WatchdogConfig};
use switch_watchdog::lifecycle::startup;
use switch_watchdog::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "switch-watchdog")]
#[command(about = "Keeps switch inputs detached while the automation hub is reachable", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print the effective settings and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WatchdogConfig::default(),
    };

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoints = ?config.probe.endpoints,
        failure_threshold = config.probe.failure_threshold,
        timeout_secs = config.probe.timeout_secs,
        interval_secs = config.probe.interval_secs,
        device = %config.device.address,
        "Configuration loaded"
    );

    if cli.check {
        println!("Configuration OK\n\n{}", config.summary()?);
        return Ok(());
    }

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
