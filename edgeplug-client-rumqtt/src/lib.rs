//! Part of [edgeplug](https://github.com/edgeplug/edgeplug), a
//! [Sparkplug](https://sparkplug.eclipse.org/) edge node client library.
//!
//! [edgeplug_client::Client] and [edgeplug_client::EventLoop]
//! implementations over [rumqttc] (MQTT v5).

mod client;
mod options;

pub use client::{Client, EventLoop};
pub use options::{MqttOptions, OptionsError};
