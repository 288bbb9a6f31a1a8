//! Status event filtering.
//!
//! A switch 0 turned on by its local timer/flip action means someone is
//! using the physical switch; check connectivity again right away.

use crate::events::status::StatusEvent;
use crate::health::RearmHandle;

/// True only for switch 0 turned on with `source == "timer"`.
pub fn should_rearm(event: &StatusEvent) -> bool {
    event.name == "switch"
        && event.id == Some(0)
        && event.source() == Some("timer")
        && event.output() == Some(true)
}

/// Re-arms the probe scheduler for matching events.
#[derive(Debug, Clone)]
pub struct StatusEventFilter {
    rearm: RearmHandle,
}

impl StatusEventFilter {
    pub fn new(rearm: RearmHandle) -> Self {
        Self { rearm }
    }

    /// Returns whether a re-arm was requested.
    pub fn on_event(&self, event: &StatusEvent) -> bool {
        if !should_rearm(event) {
            return false;
        }
        tracing::info!(component = %event.component, "Local switch toggle, re-arming probe timer");
        if !self.rearm.rearm("local-toggle") {
            tracing::debug!("Watchdog stopped, re-arm dropped");
        }
        true
    }
}
