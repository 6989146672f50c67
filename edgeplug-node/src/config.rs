use std::sync::Arc;

use edgeplug_client::{Client, DynClient, DynEventLoop, EventLoop};
use edgeplug_types::constants::SPBV01;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::session::{Session, SessionEvent, SessionHandle};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration property '{0}'")]
    Missing(&'static str),
    #[error("invalid {0}: {1}")]
    InvalidName(&'static str, String),
}

/// A builder for creating and configuring a [Session].
pub struct SessionBuilder {
    pub(crate) group_id: Option<String>,
    pub(crate) edge_node_id: Option<String>,
    pub(crate) version: String,
    pub(crate) publish_death: bool,
    pub(crate) eventloop_client: (Box<DynEventLoop>, Arc<DynClient>),
}

impl SessionBuilder {
    /// Creates a new builder with the specified event loop and client.
    pub fn new<E: EventLoop + Send + 'static, C: Client + Send + Sync + 'static>(
        eventloop: E,
        client: C,
    ) -> Self {
        Self {
            group_id: None,
            edge_node_id: None,
            version: SPBV01.to_string(),
            publish_death: false,
            eventloop_client: (Box::new(eventloop), Arc::new(client)),
        }
    }

    /// Sets the group ID the edge node belongs to. Required.
    pub fn with_group_id<S: Into<String>>(mut self, group_id: S) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets the edge node ID. Required.
    pub fn with_edge_node_id<S: Into<String>>(mut self, edge_node_id: S) -> Self {
        self.edge_node_id = Some(edge_node_id.into());
        self
    }

    /// Overrides the Sparkplug namespace version token used in topics
    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    /// Whether [SessionHandle::stop](crate::SessionHandle::stop) publishes the
    /// node death certificate before disconnecting. Defaults to false.
    pub fn with_publish_death(mut self, publish_death: bool) -> Self {
        self.publish_death = publish_death;
        self
    }

    /// Builds the session.
    ///
    /// Returns the session itself (to be run), a cloneable handle for
    /// publishing and shutdown, and the stream of session events. Missing or
    /// invalid required configuration is a fatal error here, never retried.
    #[allow(clippy::type_complexity)]
    pub fn build(
        self,
    ) -> Result<(Session, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>), ConfigError> {
        Session::new_from_builder(self)
    }
}
