use crate::{DeviceMessage, Event, Message, MessageError, MessageKind, NodeMessage, StatePayload};

use edgeplug_types::{constants::STATE, payload::Message as ProstMessage, payload::Payload};

fn message_kind(token: &str) -> MessageKind {
    match &token[1..] {
        "BIRTH" => MessageKind::Birth,
        "DEATH" => MessageKind::Death,
        "DATA" => MessageKind::Data,
        "CMD" => MessageKind::Cmd,
        _ => MessageKind::Other(token.to_string()),
    }
}

/// Classify an inbound publish.
///
/// Node messages are exactly `<version>/<group>/<N...>/<node>`, device
/// messages exactly `<version>/<group>/<D...>/<node>/<device>`, host state
/// messages `<version>/STATE/<host>`. Everything else that still decodes is
/// delivered as [Event::Message]; undecodable publishes become
/// [Event::InvalidPublish].
pub fn topic_and_payload_to_event(topic: &[u8], payload: &[u8], version: &str) -> Event {
    let invalid = |reason: MessageError| Event::InvalidPublish {
        reason,
        topic: topic.to_vec(),
        payload: payload.to_vec(),
    };

    let topic_str = match std::str::from_utf8(topic) {
        Ok(s) => s,
        Err(e) => return invalid(MessageError::TopicUtf8Error(e)),
    };
    let tokens: Vec<&str> = topic_str.split('/').collect();

    /* STATE payloads are json, not protobuf, so they are classified before
     * the payload is decoded */
    if tokens.len() == 3 && tokens[0] == version && tokens[1] == STATE {
        return match StatePayload::try_from(payload) {
            Ok(state) => Event::State {
                host_id: tokens[2].to_string(),
                payload: state,
            },
            Err(e) => invalid(MessageError::StatePayloadJsonDecodeError(e)),
        };
    }

    let decoded = match Payload::decode(payload) {
        Ok(p) => p,
        Err(e) => return invalid(MessageError::DecodePayloadError(e)),
    };

    if tokens.first() != Some(&version) {
        return Event::Message {
            topic: topic_str.to_string(),
            payload: decoded,
        };
    }

    match tokens.as_slice() {
        [_, group_id, message_type, node_id] if message_type.starts_with('N') => {
            Event::Node(NodeMessage {
                group_id: group_id.to_string(),
                node_id: node_id.to_string(),
                message: Message {
                    payload: decoded,
                    kind: message_kind(message_type),
                },
            })
        }
        [_, group_id, message_type, node_id, device_id] if message_type.starts_with('D') => {
            Event::Device(DeviceMessage {
                group_id: group_id.to_string(),
                node_id: node_id.to_string(),
                device_id: device_id.to_string(),
                message: Message {
                    payload: decoded,
                    kind: message_kind(message_type),
                },
            })
        }
        _ => Event::Message {
            topic: topic_str.to_string(),
            payload: decoded,
        },
    }
}
