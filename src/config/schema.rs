//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Connectivity probe settings.
    pub probe: ProbeConfig,

    /// Switch device settings.
    pub device: DeviceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl WatchdogConfig {
    /// Effective settings rendered as TOML, defaults filled in.
    pub fn summary(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Where the reachability check is issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeVia {
    /// GET issued by this process.
    #[default]
    Local,
    /// GET issued by the switch device through its `HTTP.GET` RPC.
    Device,
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Endpoints probed in round-robin order on failure.
    pub endpoints: Vec<String>,

    /// Consecutive failures that switch the channels to flip mode.
    pub failure_threshold: u32,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Delay between the end of one probe cycle and the next, in seconds.
    pub interval_secs: u64,

    /// Probe origin.
    pub via: ProbeVia,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["http://homeassistant.local/".to_string()],
            failure_threshold: 5,
            timeout_secs: 10,
            interval_secs: 10,
            via: ProbeVia::Local,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Switch device configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the device RPC API (e.g., "http://192.168.1.50").
    pub address: String,

    /// Subscribe to device status notifications.
    pub subscribe_events: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: "http://192.168.33.1".to_string(),
            subscribe_events: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
