//! Probe scheduling and the watchdog cycle.
//!
//! # States
//! - Idle: no timer pending (before `run`, after shutdown)
//! - Armed: one probe timer pending
//!
//! # State Transitions
//! ```text
//! Idle  → Armed: run() starts with a full interval
//! Armed → Armed: timer fires → cycle runs → timer reset to a full interval
//! Armed → Armed: re-arm request → pending timer replaced by a full interval
//! Armed → Idle:  shutdown signal
//! ```
//!
//! # Design Decisions
//! - A single `Sleep` is reset in place, so timers never stack
//! - The next timer starts after the cycle finishes (self-rescheduling)
//! - Reconciliations are spawned and never cancelled; the loop does not
//!   wait for them

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::ProbeConfig;
use crate::health::counter::FailureCounter;
use crate::health::probe::{ConnectivityProbe, ProbeOutcome, ProbeTransport};
use crate::health::rotator::EndpointRotator;
use crate::observability::metrics;
use crate::switch::{Connectivity, ModeReconciler, SwitchControl, SWITCH_CHANNELS};

/// Stand-in deadline for intervals too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + interval`, saturating instead of overflowing the clock.
fn deadline_after(interval: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(interval).unwrap_or_else(|| now + FAR_FUTURE)
}

#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("no probe endpoints configured")]
    NoEndpoints,
}

/// Requests an early probe by replacing the pending timer with a full interval.
#[derive(Debug, Clone)]
pub struct RearmHandle {
    tx: mpsc::UnboundedSender<&'static str>,
}

impl RearmHandle {
    /// Returns false once the watchdog has stopped.
    pub fn rearm(&self, reason: &'static str) -> bool {
        self.tx.send(reason).is_ok()
    }
}

/// Snapshot of the mutable watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogState {
    pub endpoint_index: usize,
    pub failures: u32,
}

/// What one probe cycle did.
#[derive(Debug)]
pub struct CycleReport {
    pub endpoint: String,
    pub outcome: ProbeOutcome,
    /// Consecutive failures after the cycle (0 after a success or a threshold reset).
    pub failures: u32,
    /// Set when the threshold was reached during this cycle.
    pub fell_back: bool,
    /// Per-channel reconciliation tasks started by this cycle.
    pub reconciliations: Vec<JoinHandle<()>>,
}

/// The connectivity watchdog: probe loop, failure policy and mode reconciliation.
pub struct Watchdog<P, S> {
    rotator: EndpointRotator,
    failures: FailureCounter,
    probe: ConnectivityProbe<P>,
    reconciler: ModeReconciler<S>,
    interval: Duration,
    rearm_rx: mpsc::UnboundedReceiver<&'static str>,
}

impl<P: ProbeTransport, S: SwitchControl> Watchdog<P, S> {
    pub fn new(
        config: &ProbeConfig,
        transport: P,
        reconciler: ModeReconciler<S>,
    ) -> Result<(Self, RearmHandle), WatchdogError> {
        let rotator =
            EndpointRotator::new(config.endpoints.clone()).ok_or(WatchdogError::NoEndpoints)?;
        let (tx, rearm_rx) = mpsc::unbounded_channel();

        let watchdog = Self {
            rotator,
            failures: FailureCounter::new(config.failure_threshold),
            probe: ConnectivityProbe::new(transport, config.timeout()),
            reconciler,
            interval: config.interval(),
            rearm_rx,
        };
        Ok((watchdog, RearmHandle { tx }))
    }

    pub fn state(&self) -> WatchdogState {
        WatchdogState {
            endpoint_index: self.rotator.index(),
            failures: self.failures.count(),
        }
    }

    /// Run until shutdown. The first probe fires one interval after start.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.probe.timeout().as_secs(),
            endpoints = self.rotator.len(),
            threshold = self.failures.threshold(),
            "Watchdog starting"
        );

        let timer = time::sleep_until(deadline_after(self.interval));
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = &mut timer => {
                    // Dropping the handles detaches the reconciliation tasks.
                    let _report = self.run_cycle().await;
                    timer.as_mut().reset(deadline_after(self.interval));
                }
                Some(reason) = self.rearm_rx.recv() => {
                    tracing::debug!(reason, "Probe timer re-armed");
                    metrics::record_rearm(reason);
                    timer.as_mut().reset(deadline_after(self.interval));
                }
                _ = shutdown.recv() => {
                    tracing::info!("Watchdog received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe the current endpoint once and apply the failure policy.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let endpoint = self.rotator.current().to_string();
        let outcome = self.probe.probe(&endpoint).await;
        let mut reconciliations = Vec::new();

        if outcome.is_success() {
            self.failures.record_success();
            reconciliations.extend(self.reconcile_all(Connectivity::Reachable));
        } else {
            let failures = self.failures.record_failure();
            let next = self.rotator.advance();
            tracing::warn!(
                endpoint = %endpoint,
                %outcome,
                failures,
                next_endpoint = next,
                "Failed to reach endpoint, rotating"
            );
        }

        let mut fell_back = false;
        if self.failures.threshold_reached() {
            tracing::warn!(
                failures = self.failures.count(),
                threshold = self.failures.threshold(),
                "Too many failures, switching to local control"
            );
            self.failures.reset();
            reconciliations.extend(self.reconcile_all(Connectivity::Unreachable));
            fell_back = true;
        }

        metrics::record_consecutive_failures(self.failures.count());

        CycleReport {
            endpoint,
            outcome,
            failures: self.failures.count(),
            fell_back,
            reconciliations,
        }
    }

    fn reconcile_all(&self, connectivity: Connectivity) -> Vec<JoinHandle<()>> {
        SWITCH_CHANNELS
            .iter()
            .map(|&channel| self.reconciler.spawn(channel, connectivity))
            .collect()
    }
}
