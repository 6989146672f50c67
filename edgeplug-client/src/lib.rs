//! Part of [edgeplug](https://github.com/edgeplug/edgeplug), a
//! [Sparkplug](https://sparkplug.eclipse.org/) edge node client library.
//!
//! This library defines the traits and types used to implement Sparkplug
//! transport clients.
//!
//! # Feature Flags
//!
//! - `channel-client`: Enables the channel based [EventLoop] and [Client]
//!   implementation. Disabled by default.

mod traits;
mod types;
mod utils;

pub use traits::{Client, DynClient, DynEventLoop, EventLoop};
pub use types::*;
pub use utils::topic_and_payload_to_event;

/// A basic [EventLoop] and [Client] implementation based on channels
///
/// Useful for writing tests where it is not appropriate to be running a real
/// MQTT client and broker setup
#[cfg(any(feature = "channel-client", doc))]
pub mod channel;
