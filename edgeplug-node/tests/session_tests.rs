mod utils;

use edgeplug_client::channel::{ChannelEventLoop, OutboundMessage};
use edgeplug_client::{DeviceMessage, Event, Message, MessageKind, StatePayload};
use edgeplug_node::{
    is_rebirth_request, maybe_compress_payload, maybe_decompress_payload, Algorithm, ConfigError,
    PayloadOptions, SessionBuilder, SessionEvent,
};
use edgeplug_types::constants::{COMPRESSED_PAYLOAD_UUID, NODE_CONTROL_REBIRTH};
use edgeplug_types::model::{Metric, Payload};
use edgeplug_types::payload::Message as ProstMessage;
use edgeplug_types::payload as wire;

use utils::*;

#[tokio::test]
async fn session_establishment() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    /* the death certificate registered as the will carries the session's
     * current bdSeq */
    let will = broker.last_will().unwrap();
    assert_eq!(will.topic, "spBv1.0/G1/NDEATH/E1");
    let will_payload = wire::Payload::decode(will.payload.as_slice()).unwrap();
    verify_death_payload(&will_payload, 0);
}

#[tokio::test]
async fn missing_configuration_is_fatal() {
    let (eventloop, client, _broker) = ChannelEventLoop::new();
    let result = SessionBuilder::new(eventloop, client)
        .with_edge_node_id("E1")
        .build();
    assert!(matches!(result, Err(ConfigError::Missing("groupId"))));

    let (eventloop, client, _broker) = ChannelEventLoop::new();
    let result = SessionBuilder::new(eventloop, client)
        .with_group_id("G1")
        .build();
    assert!(matches!(result, Err(ConfigError::Missing("edgeNode"))));

    let (eventloop, client, _broker) = ChannelEventLoop::new();
    let result = SessionBuilder::new(eventloop, client)
        .with_group_id("bad/group")
        .with_edge_node_id("E1")
        .build();
    assert!(matches!(result, Err(ConfigError::InvalidName("groupId", _))));
}

#[tokio::test]
async fn sequence_counter_wraps_after_256_publishes() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    for expected in 0..=255u64 {
        handle
            .publish_node_data(Payload::default(), &PayloadOptions::default())
            .await
            .unwrap();
        let (topic, payload) = expect_node_publish(&mut broker).await;
        assert_eq!(topic, "spBv1.0/G1/NDATA/E1");
        assert_eq!(payload.seq, Some(expected));
    }

    /* 257th publish wraps back to 0 */
    handle
        .publish_node_data(Payload::default(), &PayloadOptions::default())
        .await
        .unwrap();
    let (_, payload) = expect_node_publish(&mut broker).await;
    assert_eq!(payload.seq, Some(0));
}

#[tokio::test]
async fn node_birth_resets_sequence_and_appends_bdseq() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    for expected in 0..3u64 {
        handle
            .publish_node_data(Payload::default(), &PayloadOptions::default())
            .await
            .unwrap();
        let (_, payload) = expect_node_publish(&mut broker).await;
        assert_eq!(payload.seq, Some(expected));
    }

    let birth = Payload {
        metrics: vec![Metric::new("temperature", 20.5f64)],
        ..Default::default()
    };
    handle
        .publish_node_birth(birth, &PayloadOptions::default())
        .await
        .unwrap();
    let (topic, payload) = expect_node_publish(&mut broker).await;
    assert_eq!(topic, "spBv1.0/G1/NBIRTH/E1");
    assert_eq!(payload.seq, Some(0));
    /* bdSeq rides as the trailing metric */
    let trailing = payload.metrics.last().unwrap();
    assert_eq!(trailing.name.as_deref(), Some("bdSeq"));
    assert_eq!(trailing.value, Some(wire::metric::Value::LongValue(0)));

    handle
        .publish_node_data(Payload::default(), &PayloadOptions::default())
        .await
        .unwrap();
    let (_, payload) = expect_node_publish(&mut broker).await;
    assert_eq!(payload.seq, Some(1));
}

#[tokio::test]
async fn device_publishes_share_the_session_sequence() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;
    let options = PayloadOptions::default();

    handle
        .publish_device_birth("D7", Payload::default(), &options)
        .await
        .unwrap();
    let (topic, payload) = expect_device_publish(&mut broker).await;
    assert_eq!(topic, "spBv1.0/G1/DBIRTH/E1/D7");
    assert_eq!(payload.seq, Some(0));

    handle
        .publish_node_data(Payload::default(), &options)
        .await
        .unwrap();
    let (_, payload) = expect_node_publish(&mut broker).await;
    assert_eq!(payload.seq, Some(1));

    handle
        .publish_device_data("D7", Payload::default(), &options)
        .await
        .unwrap();
    let (topic, payload) = expect_device_publish(&mut broker).await;
    assert_eq!(topic, "spBv1.0/G1/DDATA/E1/D7");
    assert_eq!(payload.seq, Some(2));

    handle
        .publish_device_death("D7", Payload::default())
        .await
        .unwrap();
    let (topic, payload) = expect_device_publish(&mut broker).await;
    assert_eq!(topic, "spBv1.0/G1/DDEATH/E1/D7");
    assert_eq!(payload.seq, Some(3));
}

#[tokio::test]
async fn node_command_routing() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    let command = Payload {
        metrics: vec![Metric::new(NODE_CONTROL_REBIRTH, true)],
        ..Default::default()
    };
    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            EDGE_NODE_ID,
            MessageKind::Cmd,
            command.clone(),
        ))
        .unwrap();

    let event = recv_event(&mut events).await;
    let SessionEvent::NodeCommand { payload } = event else {
        panic!("expected a node command, got {event:?}");
    };
    assert!(is_rebirth_request(&payload));
    assert_eq!(payload, command);
}

#[tokio::test]
async fn device_command_routing() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    let command = Payload {
        metrics: vec![Metric::new("setpoint", 11.5f64)],
        ..Default::default()
    };
    broker
        .tx_event
        .send(Event::Device(DeviceMessage {
            group_id: GROUP_ID.to_string(),
            node_id: EDGE_NODE_ID.to_string(),
            device_id: "D7".to_string(),
            message: Message {
                payload: to_wire(command.clone()),
                kind: MessageKind::Cmd,
            },
        }))
        .unwrap();

    let event = recv_event(&mut events).await;
    assert_eq!(
        event,
        SessionEvent::DeviceCommand {
            device_id: "D7".to_string(),
            payload: command,
        }
    );
}

#[tokio::test]
async fn non_command_messages_are_delivered_as_generic_messages() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    /* a node message that is not a command */
    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            EDGE_NODE_ID,
            MessageKind::Data,
            Payload::default(),
        ))
        .unwrap();
    let event = recv_event(&mut events).await;
    assert_eq!(
        event,
        SessionEvent::Message {
            topic: "spBv1.0/G1/NDATA/E1".to_string(),
            payload: Payload::default(),
        }
    );

    /* a command for some other edge node */
    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            "OTHER",
            MessageKind::Cmd,
            Payload::default(),
        ))
        .unwrap();
    let event = recv_event(&mut events).await;
    assert_eq!(
        event,
        SessionEvent::Message {
            topic: "spBv1.0/G1/NCMD/OTHER".to_string(),
            payload: Payload::default(),
        }
    );

    /* an unclassified topic from the transport */
    broker
        .tx_event
        .send(Event::Message {
            topic: "some/other/topic".to_string(),
            payload: to_wire(Payload::default()),
        })
        .unwrap();
    let event = recv_event(&mut events).await;
    assert_eq!(
        event,
        SessionEvent::Message {
            topic: "some/other/topic".to_string(),
            payload: Payload::default(),
        }
    );
}

#[tokio::test]
async fn host_state_messages_are_surfaced_distinctly() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    broker
        .tx_event
        .send(Event::State {
            host_id: "host1".to_string(),
            payload: StatePayload::Offline { timestamp: 5 },
        })
        .unwrap();
    let event = recv_event(&mut events).await;
    assert_eq!(
        event,
        SessionEvent::HostState {
            host_id: "host1".to_string(),
            online: false,
            timestamp: 5,
        }
    );
}

#[tokio::test]
async fn compressed_publish_wraps_the_payload() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    let options = PayloadOptions {
        compress: true,
        algorithm: Some(Algorithm::Gzip),
    };
    let data = Payload {
        metrics: vec![Metric::new("speed", 99.0f32)],
        ..Default::default()
    };
    handle.publish_node_data(data, &options).await.unwrap();

    let (_, envelope) = expect_node_publish(&mut broker).await;
    assert_eq!(envelope.uuid.as_deref(), Some(COMPRESSED_PAYLOAD_UUID));
    /* the envelope itself carries no sequence number; the stamped seq lives
     * inside the compressed body */
    assert_eq!(envelope.seq, None);

    let inner = maybe_decompress_payload(envelope.try_into().unwrap()).unwrap();
    assert_eq!(inner.seq, Some(0));
    assert_eq!(inner.metrics[0].name.as_deref(), Some("speed"));
}

#[tokio::test]
async fn compressed_inbound_command_is_unwrapped_before_dispatch() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    let command = Payload {
        metrics: vec![Metric::new(NODE_CONTROL_REBIRTH, true)],
        ..Default::default()
    };
    let envelope = maybe_compress_payload(
        command.clone(),
        &PayloadOptions {
            compress: true,
            algorithm: Some(Algorithm::Deflate),
        },
    )
    .unwrap();
    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            EDGE_NODE_ID,
            MessageKind::Cmd,
            envelope,
        ))
        .unwrap();

    let event = recv_event(&mut events).await;
    assert_eq!(event, SessionEvent::NodeCommand { payload: command });
}

#[tokio::test]
async fn undecodable_messages_surface_per_message() {
    let (_handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    broker
        .tx_event
        .send(Event::InvalidPublish {
            reason: edgeplug_client::MessageError::StatePayloadJsonDecodeError(
                "bad json".to_string(),
            ),
            topic: b"spBv1.0/STATE/host1".to_vec(),
            payload: b"not json".to_vec(),
        })
        .unwrap();
    assert!(matches!(
        recv_event(&mut events).await,
        SessionEvent::InvalidMessage { .. }
    ));

    /* a compression envelope with a corrupt body is fatal for that message
     * only; the session keeps dispatching */
    let envelope = Payload {
        uuid: Some(COMPRESSED_PAYLOAD_UUID.to_string()),
        body: Some(vec![1, 2, 3]),
        ..Default::default()
    };
    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            EDGE_NODE_ID,
            MessageKind::Cmd,
            envelope,
        ))
        .unwrap();
    assert!(matches!(
        recv_event(&mut events).await,
        SessionEvent::InvalidMessage { .. }
    ));

    broker
        .tx_event
        .send(node_message(
            GROUP_ID,
            EDGE_NODE_ID,
            MessageKind::Cmd,
            Payload::default(),
        ))
        .unwrap();
    assert!(matches!(
        recv_event(&mut events).await,
        SessionEvent::NodeCommand { .. }
    ));
}

#[tokio::test]
async fn close_is_emitted_once_and_reconnect_bumps_bdseq() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    broker.tx_event.send(Event::Offline).unwrap();
    assert_eq!(recv_event(&mut events).await, SessionEvent::Offline);
    assert_eq!(recv_event(&mut events).await, SessionEvent::Close);

    /* a second close while already disconnected is swallowed */
    broker.tx_event.send(Event::Offline).unwrap();

    broker.tx_event.send(Event::Online).unwrap();
    let OutboundMessage::Subscribe(_) = recv_outbound(&mut broker).await else {
        panic!("expected resubscription on reconnect");
    };
    assert_eq!(recv_event(&mut events).await, SessionEvent::Reconnect);
    assert_eq!(recv_event(&mut events).await, SessionEvent::Connect);
    assert_eq!(recv_event(&mut events).await, SessionEvent::Birth);

    /* the refreshed will and the next birth both carry the bumped bdSeq */
    let will = broker.last_will().unwrap();
    let will_payload = wire::Payload::decode(will.payload.as_slice()).unwrap();
    verify_death_payload(&will_payload, 1);

    handle
        .publish_node_birth(Payload::default(), &PayloadOptions::default())
        .await
        .unwrap();
    let (_, payload) = expect_node_publish(&mut broker).await;
    let trailing = payload.metrics.last().unwrap();
    assert_eq!(trailing.value, Some(wire::metric::Value::LongValue(1)));
}

#[tokio::test]
async fn initial_connect_error_ends_the_session() {
    let (_handle, broker, mut events) = start_session(false);
    broker
        .tx_event
        .send(Event::ConnectError {
            reason: "connection refused".to_string(),
        })
        .unwrap();

    assert_eq!(
        recv_event(&mut events).await,
        SessionEvent::Error {
            reason: "connection refused".to_string(),
        }
    );
    /* the run loop ends, dropping the event stream */
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn stop_publishes_death_when_configured() {
    let (handle, mut broker, mut events) = start_session(true);
    go_online(&mut broker, &mut events).await;

    handle.stop().await;
    let (topic, payload) = expect_node_publish(&mut broker).await;
    assert_eq!(topic, "spBv1.0/G1/NDEATH/E1");
    verify_death_payload(&payload, 0);
    assert_eq!(recv_outbound(&mut broker).await, OutboundMessage::Disconnect);
}

#[tokio::test]
async fn stop_without_publish_death_only_disconnects() {
    let (handle, mut broker, mut events) = start_session(false);
    go_online(&mut broker, &mut events).await;

    handle.stop().await;
    assert_eq!(recv_outbound(&mut broker).await, OutboundMessage::Disconnect);
}
