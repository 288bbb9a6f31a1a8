//! Input-mode reconciliation.
//!
//! # Responsibilities
//! - Read a channel's current input mode
//! - Compare it with the mode implied by the connectivity state
//! - Write the new mode only when they differ
//!
//! # Design Decisions
//! - Read failures skip the channel for this cycle (the next cycle reads again)
//! - Write failures are logged and never retried
//! - Modes other than detached/flip count as "not detached": they are left
//!   alone while unreachable and replaced with detached once reachable

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::switch::client::{SwitchControl, SwitchError};
use crate::switch::mode::{Connectivity, InputMode};

/// What a reconciliation pass did to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Current mode already matched; nothing written.
    Unchanged { mode: InputMode },
    /// A new mode was written.
    Changed {
        from: InputMode,
        to: InputMode,
        restart_required: bool,
    },
}

/// Whether a channel in `current` mode must be rewritten for `connectivity`.
pub fn needs_change(current: &InputMode, connectivity: Connectivity) -> bool {
    current.is_detached() != connectivity.is_reachable()
}

/// Brings channel input modes in line with the connectivity state.
pub struct ModeReconciler<S> {
    switches: Arc<S>,
}

impl<S> Clone for ModeReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            switches: self.switches.clone(),
        }
    }
}

impl<S: SwitchControl> ModeReconciler<S> {
    pub fn new(switches: Arc<S>) -> Self {
        Self { switches }
    }

    /// Read-compare-write for one channel.
    pub async fn reconcile(
        &self,
        channel: u8,
        connectivity: Connectivity,
    ) -> Result<ReconcileAction, SwitchError> {
        let config = self.switches.get_config(channel).await?;
        let current = config.in_mode;

        if !needs_change(&current, connectivity) {
            tracing::debug!(channel, mode = %current, %connectivity, "Switch mode already matches");
            return Ok(ReconcileAction::Unchanged { mode: current });
        }

        let target = connectivity.desired_mode();
        let result = self.switches.set_input_mode(channel, target.clone()).await?;

        tracing::info!(
            channel,
            from = %current,
            to = %target,
            restart_required = result.restart_required,
            "Switch input mode updated"
        );
        metrics::record_mode_write(channel, &target);

        Ok(ReconcileAction::Changed {
            from: current,
            to: target,
            restart_required: result.restart_required,
        })
    }

    /// Run `reconcile` as a detached task. Failures are logged, not retried.
    pub fn spawn(&self, channel: u8, connectivity: Connectivity) -> JoinHandle<()> {
        let reconciler = self.clone();
        tokio::spawn(async move {
            if let Err(e) = reconciler.reconcile(channel, connectivity).await {
                tracing::warn!(channel, %connectivity, error = %e, "Switch reconciliation failed");
                metrics::record_reconcile_error(channel, e.kind());
            }
        })
    }
}
