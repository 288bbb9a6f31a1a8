//! Device status notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One component's status change, as delivered to a status handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Full component key (e.g., "switch:0").
    pub component: String,
    /// Component type (e.g., "switch").
    pub name: String,
    /// Instance id, absent for singleton components such as "sys".
    pub id: Option<u32>,
    /// Changed fields only.
    pub delta: Map<String, Value>,
}

impl StatusEvent {
    /// Build an event from a component key and its delta object.
    pub fn from_component(component: &str, delta: Map<String, Value>) -> Self {
        let (name, id) = match component.split_once(':') {
            Some((name, id)) => (name, id.parse().ok()),
            None => (component, None),
        };
        Self {
            component: component.to_string(),
            name: name.to_string(),
            id,
            delta,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.delta.get("source").and_then(Value::as_str)
    }

    /// `Some` only when the delta carries a boolean `output`.
    pub fn output(&self) -> Option<bool> {
        self.delta.get("output").and_then(Value::as_bool)
    }
}

#[derive(Deserialize)]
struct Notification {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Map<String, Value>,
}

/// Split a `NotifyStatus` frame into per-component events.
///
/// Other frames (RPC responses, `NotifyEvent`, `NotifyFullStatus`) and
/// malformed text yield no events.
pub fn parse_notification(text: &str) -> Vec<StatusEvent> {
    let notification: Notification = match serde_json::from_str(text) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed device frame");
            return Vec::new();
        }
    };

    if notification.method.as_deref() != Some("NotifyStatus") {
        return Vec::new();
    }

    notification
        .params
        .into_iter()
        .filter_map(|(component, value)| match value {
            Value::Object(delta) => Some(StatusEvent::from_component(&component, delta)),
            _ => None,
        })
        .collect()
}
