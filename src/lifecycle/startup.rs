//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics
//! - Build transports, reconciler and watchdog from the validated config
//! - Start background tasks (watchdog loop, event subscriber)
//! - Wait for a signal, then shut everything down
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing after startup can stop the watchdog except a signal

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{ProbeVia, WatchdogConfig};
use crate::events::{EventSubscriber, StatusEventFilter, SubscribeError};
use crate::health::{DeviceHttpProbe, HttpProbe, ProbeTransport, RearmHandle, Watchdog, WatchdogError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::metrics;
use crate::switch::{ModeReconciler, RpcClient, RpcError, RpcSwitchClient};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("metrics: {0}")]
    Metrics(String),

    #[error("device client: {0}")]
    Device(#[from] RpcError),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("watchdog: {0}")]
    Watchdog(#[from] WatchdogError),

    #[error("event subscriber: {0}")]
    Events(#[from] SubscribeError),
}

/// Client id sent with every RPC and used to receive notifications.
pub fn client_src() -> String {
    format!("switch-watchdog-{}", Uuid::new_v4().simple())
}

/// Run the watchdog until SIGINT/SIGTERM.
pub async fn run(config: WatchdogConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .map_err(|e| StartupError::Metrics(e.to_string()))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let src = client_src();
    let rpc = RpcClient::new(&config.device.address, &src)?;
    tracing::info!(device = %rpc.endpoint(), src = %src, "Device RPC client ready");

    let reconciler = ModeReconciler::new(Arc::new(RpcSwitchClient::new(rpc.clone())));
    let shutdown = Shutdown::new();

    let tasks = match config.probe.via {
        ProbeVia::Local => spawn_tasks(&config, HttpProbe::new()?, reconciler, &src, &shutdown)?,
        ProbeVia::Device => {
            spawn_tasks(&config, DeviceHttpProbe::new(rpc), reconciler, &src, &shutdown)?
        }
    };

    wait_for_signal().await;
    tracing::info!(tasks = shutdown.receiver_count(), "Shutting down");
    shutdown.trigger();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task ended abnormally");
        }
    }
    Ok(())
}

fn spawn_tasks<P: ProbeTransport>(
    config: &WatchdogConfig,
    transport: P,
    reconciler: ModeReconciler<RpcSwitchClient>,
    src: &str,
    shutdown: &Shutdown,
) -> Result<Vec<JoinHandle<()>>, StartupError> {
    let (watchdog, rearm) = Watchdog::new(&config.probe, transport, reconciler)?;
    let mut tasks = Vec::new();

    if let Some(subscriber) = build_subscriber(config, src, rearm)? {
        tasks.push(tokio::spawn(subscriber.run(shutdown.subscribe())));
    }
    tasks.push(tokio::spawn(watchdog.run(shutdown.subscribe())));

    Ok(tasks)
}

fn build_subscriber(
    config: &WatchdogConfig,
    src: &str,
    rearm: RearmHandle,
) -> Result<Option<EventSubscriber>, StartupError> {
    if !config.device.subscribe_events {
        tracing::info!("Device event subscription disabled");
        return Ok(None);
    }
    let filter = StatusEventFilter::new(rearm);
    Ok(Some(EventSubscriber::new(&config.device.address, src, filter)?))
}
