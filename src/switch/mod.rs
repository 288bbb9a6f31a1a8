//! Switch channel subsystem.
//!
//! # Data Flow
//! ```text
//! Connectivity state (from the probe scheduler)
//!     → reconciler.rs (read-compare-write per channel)
//!     → client.rs (Switch.GetConfig / Switch.SetConfig over JSON-RPC)
//!     → mode.rs (typed input modes and channel config)
//! ```
//!
//! # Design Decisions
//! - Exactly two channels are managed
//! - Writes only happen when the read mode disagrees with the target
//! - Each channel is reconciled independently; completion order is not fixed

pub mod client;
pub mod mode;
pub mod reconciler;

pub use client::{RpcClient, RpcError, RpcSwitchClient, SwitchControl, SwitchError};
pub use mode::{Connectivity, InputMode, SetConfigResult, SwitchConfig};
pub use reconciler::{ModeReconciler, ReconcileAction};

/// Channels reconciled on every pass.
pub const SWITCH_CHANNELS: [u8; 2] = [0, 1];
