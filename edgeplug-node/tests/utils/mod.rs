use std::time::Duration;

use edgeplug_client::channel::{ChannelBroker, ChannelEventLoop, OutboundMessage};
use edgeplug_client::{Event, Message, MessageKind, NodeMessage};
use edgeplug_node::{SessionBuilder, SessionEvent, SessionHandle};
use edgeplug_types::constants::BDSEQ;
use edgeplug_types::model::Payload;
use edgeplug_types::payload as wire;
use edgeplug_types::payload::DataType;
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const GROUP_ID: &str = "G1";
pub const EDGE_NODE_ID: &str = "E1";

pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

pub fn start_session(publish_death: bool) -> (SessionHandle, ChannelBroker, SessionEvents) {
    let (eventloop, client, broker) = ChannelEventLoop::new();
    let (session, handle, events) = SessionBuilder::new(eventloop, client)
        .with_group_id(GROUP_ID)
        .with_edge_node_id(EDGE_NODE_ID)
        .with_publish_death(publish_death)
        .build()
        .unwrap();
    tokio::spawn(async move { session.run().await });
    (handle, broker, events)
}

pub async fn recv_outbound(broker: &mut ChannelBroker) -> OutboundMessage {
    timeout(Duration::from_secs(1), broker.rx_outbound.recv())
        .await
        .expect("timed out waiting for an outbound message")
        .expect("outbound channel closed")
}

pub async fn recv_event(events: &mut SessionEvents) -> SessionEvent {
    timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for a session event")
        .expect("session event channel closed")
}

/// Drive the session online and consume the connect choreography: the
/// command subscriptions and the Connect/Birth events
pub async fn go_online(broker: &mut ChannelBroker, events: &mut SessionEvents) {
    broker.tx_event.send(Event::Online).unwrap();

    let subscribe = recv_outbound(broker).await;
    let OutboundMessage::Subscribe(filters) = subscribe else {
        panic!("expected the connect-time subscriptions, got {subscribe:?}");
    };
    let topics: Vec<String> = filters.into_iter().map(|f| f.topic.into()).collect();
    assert_eq!(
        topics,
        vec![
            "spBv1.0/G1/NCMD/E1".to_string(),
            "spBv1.0/G1/DCMD/E1/#".to_string(),
            "spBv1.0/STATE/#".to_string(),
        ]
    );

    assert_eq!(recv_event(events).await, SessionEvent::Connect);
    assert_eq!(recv_event(events).await, SessionEvent::Birth);
}

pub fn to_wire(payload: Payload) -> wire::Payload {
    payload.try_into().unwrap()
}

pub fn node_message(group_id: &str, node_id: &str, kind: MessageKind, payload: Payload) -> Event {
    Event::Node(NodeMessage {
        group_id: group_id.to_string(),
        node_id: node_id.to_string(),
        message: Message {
            payload: to_wire(payload),
            kind,
        },
    })
}

pub async fn expect_node_publish(broker: &mut ChannelBroker) -> (String, wire::Payload) {
    match recv_outbound(broker).await {
        OutboundMessage::NodeMessage { topic, payload } => (topic.topic, payload),
        other => panic!("expected a node publish, got {other:?}"),
    }
}

pub async fn expect_device_publish(broker: &mut ChannelBroker) -> (String, wire::Payload) {
    match recv_outbound(broker).await {
        OutboundMessage::DeviceMessage { topic, payload } => (topic.topic, payload),
        other => panic!("expected a device publish, got {other:?}"),
    }
}

/// Assert a death certificate payload: a single bdSeq metric with the
/// expected value and no sequence number
pub fn verify_death_payload(payload: &wire::Payload, expected_bdseq: u64) {
    assert_eq!(payload.seq, None);
    assert_ne!(payload.timestamp, None);
    assert_eq!(payload.metrics.len(), 1);
    let metric = &payload.metrics[0];
    assert_eq!(metric.name.as_deref(), Some(BDSEQ));
    assert_eq!(metric.datatype, Some(DataType::UInt64 as u32));
    assert_eq!(
        metric.value,
        Some(wire::metric::Value::LongValue(expected_bdseq))
    );
}
