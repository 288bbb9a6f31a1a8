//! Connectivity probing.
//!
//! # Responsibilities
//! - Issue one reachability check against an endpoint
//! - Bound every check with a timeout
//! - Classify the result into a `ProbeOutcome`
//!
//! # Design Decisions
//! - Any HTTP response counts as success: the endpoint answered
//! - Device sentinel codes and client errors are classified at the
//!   transport boundary, never interpreted further up
//! - All failure kinds are handled the same way by the scheduler

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::time;

use crate::observability::metrics;
use crate::switch::client::{RpcClient, RpcError};

/// Device error code for "request timed out".
pub const ERROR_CODE_TIMEOUT: i32 = -104;

/// Device error code for "connection failed".
pub const ERROR_CODE_CONNECTION: i32 = -114;

/// Extra time granted on top of the probe timeout before the outer deadline fires.
const PROBE_GRACE: Duration = Duration::from_secs(1);

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    Success,
    TimeoutFailure,
    ConnectionFailure,
    OtherFailure,
}

impl ProbeOutcome {
    /// Classify a device error code (0 means success).
    pub fn from_error_code(code: i32) -> Self {
        match code {
            0 => ProbeOutcome::Success,
            ERROR_CODE_TIMEOUT => ProbeOutcome::TimeoutFailure,
            ERROR_CODE_CONNECTION => ProbeOutcome::ConnectionFailure,
            _ => ProbeOutcome::OtherFailure,
        }
    }

    /// Classify a transport result.
    pub fn from_transport<T>(result: &Result<T, TransportError>) -> Self {
        match result {
            Ok(_) => ProbeOutcome::Success,
            Err(TransportError::Timeout) => ProbeOutcome::TimeoutFailure,
            Err(TransportError::Connect(_)) => ProbeOutcome::ConnectionFailure,
            Err(TransportError::Other(_)) => ProbeOutcome::OtherFailure,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::TimeoutFailure => "timeout",
            ProbeOutcome::ConnectionFailure => "connection",
            ProbeOutcome::OtherFailure => "other",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level probe failure, before classification.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Issues an HTTP GET and reports how it went.
pub trait ProbeTransport: Send + Sync + 'static {
    fn http_get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Probes from this host with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("switch-watchdog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ProbeTransport for HttpProbe {
    async fn http_get(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let result = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map(|response| response.status())
            .map_err(TransportError::from);

        match &result {
            Ok(status) => tracing::trace!(url, %status, "Probe answered"),
            Err(e) => tracing::debug!(url, error = %e, "Probe transport error"),
        }
        ProbeOutcome::from_transport(&result)
    }
}

#[derive(Deserialize)]
struct HttpGetResult {
    #[serde(default)]
    code: u16,
}

/// Asks the switch device to perform the GET through its `HTTP.GET` RPC.
#[derive(Debug, Clone)]
pub struct DeviceHttpProbe {
    rpc: RpcClient,
}

impl DeviceHttpProbe {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

impl ProbeTransport for DeviceHttpProbe {
    async fn http_get(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let params = json!({ "url": url, "timeout": timeout.as_secs().max(1) });
        match self.rpc.call::<_, HttpGetResult>("HTTP.GET", params).await {
            Ok(answer) => {
                tracing::trace!(url, status = answer.code, "Probe answered");
                ProbeOutcome::Success
            }
            Err(RpcError::Rpc { code, message }) => {
                tracing::debug!(url, code, %message, "Device probe error");
                ProbeOutcome::from_error_code(code)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "Device unreachable for probe");
                ProbeOutcome::OtherFailure
            }
        }
    }
}

/// A transport plus the timeout applied to every check.
pub struct ConnectivityProbe<T> {
    transport: T,
    timeout: Duration,
}

impl<T: ProbeTransport> ConnectivityProbe<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `endpoint`. A transport that outlives the timeout is a `TimeoutFailure`.
    pub async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        let check = self.transport.http_get(endpoint, self.timeout);
        let deadline = self.timeout.saturating_add(PROBE_GRACE);
        let outcome = match time::timeout(deadline, check).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::TimeoutFailure,
        };

        tracing::info!(endpoint, %outcome, "Probe completed");
        metrics::record_probe(outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;

    #[test]
    fn test_error_code_classification() {
        assert_eq!(ProbeOutcome::from_error_code(0), ProbeOutcome::Success);
        assert_eq!(ProbeOutcome::from_error_code(-104), ProbeOutcome::TimeoutFailure);
        assert_eq!(ProbeOutcome::from_error_code(-114), ProbeOutcome::ConnectionFailure);
        assert_eq!(ProbeOutcome::from_error_code(-1), ProbeOutcome::OtherFailure);
        assert_eq!(ProbeOutcome::from_error_code(-103), ProbeOutcome::OtherFailure);
    }

    #[test]
    fn test_transport_classification() {
        let ok: Result<(), TransportError> = Ok(());
        assert!(ProbeOutcome::from_transport(&ok).is_success());

        let timeout: Result<(), _> = Err(TransportError::Timeout);
        assert_eq!(ProbeOutcome::from_transport(&timeout), ProbeOutcome::TimeoutFailure);

        let refused: Result<(), _> = Err(TransportError::Connect("refused".into()));
        assert_eq!(ProbeOutcome::from_transport(&refused), ProbeOutcome::ConnectionFailure);
    }

    struct HangingTransport;

    impl ProbeTransport for HangingTransport {
        async fn http_get(&self, _url: &str, _timeout: Duration) -> ProbeOutcome {
            future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_transport_times_out() {
        let probe = ConnectivityProbe::new(HangingTransport, Duration::from_secs(10));
        assert_eq!(probe.probe("http://hub/").await, ProbeOutcome::TimeoutFailure);
    }

    struct AnsweringTransport;

    impl ProbeTransport for AnsweringTransport {
        async fn http_get(&self, _url: &str, _timeout: Duration) -> ProbeOutcome {
            ProbeOutcome::Success
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_maximum_timeout_does_not_overflow() {
        let probe = ConnectivityProbe::new(AnsweringTransport, Duration::from_secs(u64::MAX));
        assert_eq!(probe.probe("http://hub/").await, ProbeOutcome::Success);

        let probe = ConnectivityProbe::new(HangingTransport, Duration::MAX);
        let outcome = time::timeout(Duration::from_secs(3600), probe.probe("http://hub/")).await;
        assert!(outcome.is_err(), "a stuck transport keeps waiting");
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = ConnectivityProbe::new(HttpProbe::new().unwrap(), Duration::from_secs(2));
        let outcome = probe.probe(&format!("http://{}/", addr)).await;
        assert_eq!(outcome, ProbeOutcome::ConnectionFailure);
    }
}
