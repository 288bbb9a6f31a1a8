//! Resilience helpers.
//!
//! # Design Decisions
//! - Probe failures are not retried: they feed the failure counter instead
//! - Only the device event stream reconnects, with capped exponential backoff

pub mod backoff;
