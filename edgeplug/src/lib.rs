//! A [Sparkplug](https://sparkplug.eclipse.org/) B edge node client library:
//! payload codec, topic grammar and a session client over MQTT.
//!
//! # Example
//!
//! ```no_run
//! use edgeplug::client::mqtt_client::rumqtt;
//! use edgeplug::node::{PayloadOptions, SessionBuilder, SessionEvent};
//! use edgeplug::types::model::{Metric, Payload};
//!
//! #[tokio::main]
//! async fn main() {
//!     let options =
//!         rumqtt::MqttOptions::new("client1", "tcp://localhost:1883", "admin", "changeme");
//!     let (eventloop, client) =
//!         rumqtt::EventLoop::new(options, "spBv1.0".to_string(), 10).unwrap();
//!     let (session, handle, mut events) = SessionBuilder::new(eventloop, client)
//!         .with_group_id("plant1")
//!         .with_edge_node_id("line4")
//!         .build()
//!         .unwrap();
//!     tokio::spawn(async move { session.run().await });
//!
//!     while let Some(event) = events.recv().await {
//!         if let SessionEvent::Birth = event {
//!             let birth = Payload {
//!                 metrics: vec![Metric::new("temperature", 20.5f64)],
//!                 ..Default::default()
//!             };
//!             handle
//!                 .publish_node_birth(birth, &PayloadOptions::default())
//!                 .await
//!                 .unwrap();
//!         }
//!     }
//! }
//! ```

pub use edgeplug_node as node;
pub use edgeplug_types as types;
pub mod client {
    pub use edgeplug_client::*;

    pub mod mqtt_client {
        pub use edgeplug_client_rumqtt as rumqtt;
    }
}
