//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watchdog_probes_total` (counter): probes by outcome
//! - `watchdog_consecutive_failures` (gauge): current failure streak
//! - `watchdog_mode_writes_total` (counter): input-mode writes by channel and mode
//! - `watchdog_reconcile_errors_total` (counter): failed reads/writes by channel
//! - `watchdog_rearms_total` (counter): out-of-band timer re-arms by reason
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::health::probe::ProbeOutcome;
use crate::switch::mode::InputMode;

/// Install the Prometheus recorder with its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_probe(outcome: ProbeOutcome) {
    counter!("watchdog_probes_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_consecutive_failures(count: u32) {
    gauge!("watchdog_consecutive_failures").set(f64::from(count));
}

pub fn record_mode_write(channel: u8, mode: &InputMode) {
    counter!(
        "watchdog_mode_writes_total",
        "channel" => channel.to_string(),
        "mode" => mode.as_str().to_string()
    )
    .increment(1);
}

pub fn record_reconcile_error(channel: u8, kind: &'static str) {
    counter!(
        "watchdog_reconcile_errors_total",
        "channel" => channel.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_rearm(reason: &'static str) {
    counter!("watchdog_rearms_total", "reason" => reason).increment(1);
}
