use std::str::Utf8Error;

use edgeplug_types::{
    payload::{Payload, StateCertificate},
    topic::{NodeMessage as NodeMessageType, NodeTopic, QoS},
};
use prost::DecodeError;
use thiserror::Error;

/// Error conditions raised while turning an inbound publish into an [Event]
#[derive(Error, Debug, PartialEq)]
pub enum MessageError {
    #[error("there was an error decoding the payload: {0}")]
    DecodePayloadError(DecodeError),
    #[error("topic utf8 decode error: {0}")]
    TopicUtf8Error(#[from] Utf8Error),
    #[error("unable to decode state message as json: {0}")]
    StatePayloadJsonDecodeError(String),
}

/// An enum representing the different type of message.
#[derive(Debug, PartialEq)]
pub enum MessageKind {
    Birth,
    Death,
    Cmd,
    Data,
    /// An unrecognised message type; carries the raw message-type token
    Other(String),
}

/// A message payload together with the type of topic it was received on
#[derive(Debug, PartialEq)]
pub struct Message {
    pub payload: Payload,
    pub kind: MessageKind,
}

/// A message published on a host application's STATE topic
#[derive(Debug, Clone, PartialEq)]
pub enum StatePayload {
    Online { timestamp: u64 },
    Offline { timestamp: u64 },
}

impl StatePayload {
    pub fn timestamp(&self) -> u64 {
        match self {
            StatePayload::Online { timestamp } | StatePayload::Offline { timestamp } => *timestamp,
        }
    }
}

impl TryFrom<&[u8]> for StatePayload {
    type Error = String;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let certificate = StateCertificate::try_from(value)?;
        let out = if certificate.online {
            StatePayload::Online {
                timestamp: certificate.timestamp,
            }
        } else {
            StatePayload::Offline {
                timestamp: certificate.timestamp,
            }
        };
        Ok(out)
    }
}

/// Represents a message from a Node.
#[derive(Debug, PartialEq)]
pub struct NodeMessage {
    /// The group the node belongs to.
    pub group_id: String,
    /// The nodes unique identifier.
    pub node_id: String,
    /// The message.
    pub message: Message,
}

/// Represents a message from a Device.
#[derive(Debug, PartialEq)]
pub struct DeviceMessage {
    /// The group the node belongs to.
    pub group_id: String,
    /// The nodes unique identifier.
    pub node_id: String,
    /// The devices unique identifier.
    pub device_id: String,
    /// The message.
    pub message: Message,
}

/// The events an [EventLoop](crate::EventLoop) implementation can produce
#[derive(Debug, PartialEq)]
pub enum Event {
    /// The transport connected
    Online,
    /// The transport connection dropped
    Offline,
    /// The initial connection attempt failed; never produced once a
    /// connection has been established
    ConnectError { reason: String },
    Node(NodeMessage),
    Device(DeviceMessage),
    State {
        host_id: String,
        payload: StatePayload,
    },
    /// A decodable publish on a topic outside the Sparkplug grammar; still
    /// delivered rather than dropped
    Message { topic: String, payload: Payload },
    /// An inbound publish that could not be decoded; surfaced per message,
    /// the session keeps running
    InvalidPublish {
        reason: MessageError,
        topic: Vec<u8>,
        payload: Vec<u8>,
    },
}

/// Structure representing the last will of a Node
#[derive(Debug, Clone, PartialEq)]
pub struct LastWill {
    pub topic: String,
    pub retain: bool,
    pub qos: QoS,
    pub payload: Vec<u8>,
}

impl LastWill {
    pub fn new_node(version: &str, group: &str, node_id: &str, payload: Payload) -> Self {
        let topic = NodeTopic::new(version, group, NodeMessageType::NDeath, node_id);
        let (qos, retain) = topic.get_publish_quality_retain();
        Self {
            retain,
            qos,
            payload: payload.into(),
            topic: topic.topic,
        }
    }
}
