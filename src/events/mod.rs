//! Device status events.
//!
//! # Data Flow
//! ```text
//! device WebSocket (NotifyStatus frames)
//!     → subscriber.rs (connect, register, reconnect with backoff)
//!     → status.rs (one StatusEvent per component key)
//!     → filter.rs (switch 0 / source timer / output true?)
//!     → RearmHandle (replace the pending probe timer)
//! ```

pub mod filter;
pub mod status;
pub mod subscriber;

pub use filter::{should_rearm, StatusEventFilter};
pub use status::{parse_notification, StatusEvent};
pub use subscriber::{EventSubscriber, SubscribeError};
