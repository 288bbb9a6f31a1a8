//! Connectivity watchdog subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs timer fires
//!     → probe.rs checks rotator.rs current endpoint (bounded by timeout)
//!     → failure: counter.rs increments, rotator.rs advances
//!     → success: counter.rs resets, both channels reconciled to "reachable"
//!     → threshold reached: counter.rs resets, both channels reconciled to "unreachable"
//!     → scheduler.rs re-arms for a full interval
//!
//! Out of band:
//!     events filter → RearmHandle → scheduler.rs replaces pending timer
//! ```
//!
//! # Design Decisions
//! - All state lives in one `Watchdog` value driven by a single task
//! - Endpoints rotate only on failure
//! - Every success reconciles both channels; writes happen only on mismatch

pub mod counter;
pub mod probe;
pub mod rotator;
pub mod scheduler;

pub use counter::FailureCounter;
pub use probe::{
    ConnectivityProbe, DeviceHttpProbe, HttpProbe, ProbeOutcome, ProbeTransport, TransportError,
};
pub use rotator::EndpointRotator;
pub use scheduler::{CycleReport, RearmHandle, Watchdog, WatchdogError, WatchdogState};
