//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold > 0, timeout and interval within 1s..=1 day)
//! - Check that endpoint and device addresses are usable URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::WatchdogConfig;

/// Upper bound for `probe.timeout_secs` and `probe.interval_secs`.
pub const MAX_PROBE_SECS: u64 = 86_400;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe.endpoints must not be empty")]
    NoEndpoints,

    #[error("probe endpoint '{endpoint}' is invalid: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("probe.{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("probe.{field} must be at most {max} seconds")]
    TooLarge { field: &'static str, max: u64 },

    #[error("device.address '{address}' is invalid: {reason}")]
    InvalidDeviceAddress { address: String, reason: String },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

fn check_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let probe = &config.probe;

    if probe.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for endpoint in &probe.endpoints {
        if let Err(reason) = check_http_url(endpoint) {
            errors.push(ValidationError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason,
            });
        }
    }

    if probe.failure_threshold == 0 {
        errors.push(ValidationError::Zero { field: "failure_threshold" });
    }
    for (field, secs) in [
        ("timeout_secs", probe.timeout_secs),
        ("interval_secs", probe.interval_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::Zero { field });
        } else if secs > MAX_PROBE_SECS {
            errors.push(ValidationError::TooLarge {
                field,
                max: MAX_PROBE_SECS,
            });
        }
    }

    if let Err(reason) = check_http_url(&config.device.address) {
        errors.push(ValidationError::InvalidDeviceAddress {
            address: config.device.address.clone(),
            reason,
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
