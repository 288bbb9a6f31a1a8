//! Device status stream over WebSocket.
//!
//! # Responsibilities
//! - Connect to the device `/rpc` WebSocket
//! - Register for notifications by sending one request with our `src`
//! - Feed every status event through the filter
//! - Reconnect with backoff until shutdown
//!
//! # Design Decisions
//! - The probe loop never depends on this stream being up
//! - Backoff resets after every successful connect

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use crate::events::filter::StatusEventFilter;
use crate::events::status::parse_notification;
use crate::resilience::backoff::Backoff;

const RECONNECT_BASE: Duration = Duration::from_secs(1);
const RECONNECT_MAX: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("invalid device address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Derive the notification socket URL from the device base address.
pub fn event_url(address: &str) -> Result<Url, SubscribeError> {
    let invalid = |reason: String| SubscribeError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let mut url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to websocket scheme".to_string()))?;
    url.join("/rpc").map_err(|e| invalid(e.to_string()))
}

/// Long-running subscriber task.
pub struct EventSubscriber {
    url: Url,
    src: String,
    filter: StatusEventFilter,
}

impl EventSubscriber {
    pub fn new(address: &str, src: &str, filter: StatusEventFilter) -> Result<Self, SubscribeError> {
        Ok(Self {
            url: event_url(address)?,
            src: src.to_string(),
            filter,
        })
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut backoff = Backoff::new(RECONNECT_BASE, RECONNECT_MAX);

        loop {
            tokio::select! {
                result = self.session(&mut backoff) => match result {
                    Ok(()) => tracing::info!(url = %self.url, "Event stream closed by device"),
                    Err(e) => tracing::warn!(url = %self.url, error = %e, "Event stream failed"),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Event subscriber received shutdown signal, exiting loop");
                    return;
                }
            }

            let delay = backoff.next_delay();
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnecting event stream");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => return,
            }
        }
    }

    async fn session(&self, backoff: &mut Backoff) -> Result<(), SubscribeError> {
        let (mut socket, _) = connect_async(self.url.as_str()).await?;
        tracing::info!(url = %self.url, "Event stream connected");
        backoff.reset();

        let hello = json!({ "id": 1, "src": self.src, "method": "Shelly.GetStatus" });
        socket.send(Message::text(hello.to_string())).await?;

        while let Some(message) = socket.next().await {
            match message? {
                Message::Text(text) => {
                    for event in parse_notification(text.as_str()) {
                        self.filter.on_event(&event);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}
