//! Connectivity watchdog for a two-channel smart switch.
//!
//! Probes the home-automation hub and keeps both switch inputs in
//! `detached` mode while it is reachable, falling back to `flip` mode
//! (local toggle) once it is not.

pub mod config;
pub mod events;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod switch;

pub use config::WatchdogConfig;
pub use health::{RearmHandle, Watchdog};
pub use lifecycle::Shutdown;
