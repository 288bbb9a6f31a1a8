//! Device JSON-RPC client.
//!
//! # Responsibilities
//! - Frame JSON-RPC requests for the device `/rpc` endpoint
//! - Decode `result` / `error` responses
//! - Read and write switch channel configuration
//!
//! # Design Decisions
//! - No request timeout on configuration calls; a hung call only stalls
//!   the reconciliation that issued it
//! - Request ids are process-unique and monotonically increasing

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::switch::mode::{InputMode, SetConfigResult, SwitchConfig};

/// Errors from a single RPC exchange with the device.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP request itself failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The device answered with an RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The response was not a valid RPC frame.
    #[error("invalid RPC response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RpcError::Decode(e.to_string())
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

/// Errors surfaced by switch configuration access.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("reading config of switch {channel} failed: {reason}")]
    Read { channel: u8, reason: String },

    #[error("writing config of switch {channel} failed: {reason}")]
    Write { channel: u8, reason: String },
}

impl SwitchError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SwitchError::Read { .. } => "read",
            SwitchError::Write { .. } => "write",
        }
    }
}

/// Read/write access to switch channel configuration.
pub trait SwitchControl: Send + Sync + 'static {
    fn get_config(
        &self,
        channel: u8,
    ) -> impl Future<Output = Result<SwitchConfig, SwitchError>> + Send;

    fn set_input_mode(
        &self,
        channel: u8,
        mode: InputMode,
    ) -> impl Future<Output = Result<SetConfigResult, SwitchError>> + Send;
}

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    id: u64,
    src: &'a str,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i32,
    #[serde(default)]
    message: String,
}

/// Turn a decoded response frame into the typed result.
fn decode_response<R: DeserializeOwned>(response: RpcResponse) -> Result<R, RpcError> {
    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = response
        .result
        .ok_or_else(|| RpcError::Decode("response has neither result nor error".to_string()))?;
    serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
}

/// HTTP JSON-RPC client for one device.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    endpoint: Url,
    src: Arc<str>,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a client for the device at `address` (e.g. "http://192.168.1.50").
    pub fn new(address: &str, src: &str) -> Result<Self, RpcError> {
        let base = Url::parse(address).map_err(|e| RpcError::Transport(e.to_string()))?;
        let endpoint = base
            .join("/rpc")
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("switch-watchdog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            src: Arc::from(src),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issue one RPC call and decode its result.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            src: &*self.src,
            method,
            params,
        };

        tracing::trace!(method, id = request.id, "RPC request");

        let response: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        decode_response(response)
    }
}

/// `SwitchControl` backed by the device `Switch.GetConfig` / `Switch.SetConfig` RPCs.
#[derive(Debug, Clone)]
pub struct RpcSwitchClient {
    rpc: RpcClient,
}

impl RpcSwitchClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

impl SwitchControl for RpcSwitchClient {
    async fn get_config(&self, channel: u8) -> Result<SwitchConfig, SwitchError> {
        self.rpc
            .call("Switch.GetConfig", json!({ "id": channel }))
            .await
            .map_err(|e| SwitchError::Read {
                channel,
                reason: e.to_string(),
            })
    }

    async fn set_input_mode(
        &self,
        channel: u8,
        mode: InputMode,
    ) -> Result<SetConfigResult, SwitchError> {
        let params = json!({
            "id": channel,
            "config": { "in_mode": mode.as_str() },
        });
        self.rpc
            .call("Switch.SetConfig", params)
            .await
            .map_err(|e| SwitchError::Write {
                channel,
                reason: e.to_string(),
            })
    }
}
