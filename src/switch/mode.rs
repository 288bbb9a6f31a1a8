//! Switch input-mode model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical connectivity state the channels are reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    Reachable,
    Unreachable,
}

impl Connectivity {
    pub fn is_reachable(self) -> bool {
        matches!(self, Connectivity::Reachable)
    }

    /// Input mode a channel should be in for this state.
    pub fn desired_mode(self) -> InputMode {
        match self {
            Connectivity::Reachable => InputMode::Detached,
            Connectivity::Unreachable => InputMode::Flip,
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Reachable => f.write_str("reachable"),
            Connectivity::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Input mode of a switch channel as reported by the device.
///
/// Modes other than `detached` and `flip` are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputMode {
    Detached,
    Flip,
    Other(String),
}

impl InputMode {
    pub fn as_str(&self) -> &str {
        match self {
            InputMode::Detached => "detached",
            InputMode::Flip => "flip",
            InputMode::Other(mode) => mode,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, InputMode::Detached)
    }
}

impl From<String> for InputMode {
    fn from(mode: String) -> Self {
        match mode.as_str() {
            "detached" => InputMode::Detached,
            "flip" => InputMode::Flip,
            _ => InputMode::Other(mode),
        }
    }
}

impl From<&str> for InputMode {
    fn from(mode: &str) -> Self {
        InputMode::from(mode.to_string())
    }
}

impl From<InputMode> for String {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::Other(mode) => mode,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel configuration returned by `Switch.GetConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub id: u8,

    pub in_mode: InputMode,

    /// Remaining device fields (name, initial_state, auto_on, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SwitchConfig {
    pub fn new(id: u8, in_mode: InputMode) -> Self {
        Self {
            id,
            in_mode,
            extra: Map::new(),
        }
    }
}

/// Result of `Switch.SetConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetConfigResult {
    #[serde(default)]
    pub restart_required: bool,
}
