use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc, Mutex,
};

use log::{debug, info, warn};

use edgeplug_client::{
    DeviceMessage, DynClient, DynEventLoop, Event, LastWill, MessageKind, NodeMessage,
    StatePayload,
};
use edgeplug_types::{
    constants::{self, BDSEQ, NODE_CONTROL_REBIRTH},
    model::{Metric, Payload},
    payload,
    topic::{
        device_topic_raw, node_topic_raw, DeviceMessage as DeviceMessageType, DeviceTopic,
        NodeMessage as NodeMessageType, NodeTopic, StateTopic, Topic, TopicFilter,
    },
    utils::timestamp,
    EncodeValueError, Value,
};
use thiserror::Error;
use tokio::{select, sync::mpsc};

use crate::compression::{
    maybe_compress_payload, maybe_decompress_payload, CompressionError, PayloadOptions,
};
use crate::config::{ConfigError, SessionBuilder};

/// Typed events produced by a running [Session]
#[derive(Debug, PartialEq)]
pub enum SessionEvent {
    /// The session is connected and the command subscriptions are in place
    Connect,
    /// Emitted after [SessionEvent::Connect]: birth payloads should now be
    /// published by the caller
    Birth,
    /// The transport connection dropped
    Offline,
    /// The session left the connected state; emitted exactly once per
    /// connection
    Close,
    /// The transport re-established a connection after a loss; followed by
    /// [SessionEvent::Connect]
    Reconnect,
    /// The initial connection attempt failed. The session run loop ends
    /// after surfacing this; errors after a connection was established are
    /// left to the transport's own reconnection policy instead.
    Error { reason: String },
    /// A node command addressed to this edge node
    NodeCommand { payload: Payload },
    /// A device command addressed to a device of this edge node
    DeviceCommand { device_id: String, payload: Payload },
    /// A host application went online or offline
    HostState {
        host_id: String,
        online: bool,
        timestamp: u64,
    },
    /// A message outside this session's command grammar, delivered rather
    /// than dropped
    Message { topic: String, payload: Payload },
    /// An inbound message that could not be decoded; the session keeps
    /// processing subsequent messages
    InvalidMessage { reason: String },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Encode(#[from] EncodeValueError),
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error("the transport rejected the publish")]
    Transport,
}

/// True when a node command payload carries a rebirth request.
///
/// Acting on the request (republishing births) is the caller's
/// responsibility; the session only exposes the decoded command.
pub fn is_rebirth_request(payload: &Payload) -> bool {
    payload.metrics.iter().any(|metric| {
        metric.name.as_deref() == Some(NODE_CONTROL_REBIRTH)
            && metric.value == Some(Value::Boolean(true))
    })
}

struct SessionStateInner {
    seq: u8,
    connected: bool,
}

pub(crate) struct SessionState {
    bdseq: AtomicU8,
    inner: Mutex<SessionStateInner>,
    group_id: String,
    edge_node_id: String,
    version: String,
    publish_death: bool,
}

impl SessionState {
    /* One counter is shared by every publish under the session: stamp the
     * current value, then increment with wrap at 255 */
    fn next_seq(&self) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.seq;
        inner.seq = inner.seq.wrapping_add(1);
        seq as u64
    }

    /* A node birth always carries seq 0 and restarts the counter */
    fn next_seq_after_reset(&self) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.seq = 1;
        0
    }

    fn reset_seq(&self) {
        self.inner.lock().unwrap().seq = 0;
    }

    fn connected_swap(&self, connected: bool) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let old = inner.connected;
        inner.connected = connected;
        old
    }

    fn bdseq(&self) -> u64 {
        self.bdseq.load(Ordering::SeqCst) as u64
    }

    fn death_payload(&self) -> payload::Payload {
        let mut metric = payload::Metric::new();
        metric
            .set_name(BDSEQ.to_string())
            .set_datatype(payload::DataType::UInt64)
            .set_value(payload::metric::Value::LongValue(self.bdseq()));
        payload::Payload {
            timestamp: Some(timestamp()),
            metrics: vec![metric],
            seq: None,
            uuid: None,
            body: None,
        }
    }

    fn create_last_will(&self) -> LastWill {
        LastWill::new_node(
            &self.version,
            &self.group_id,
            &self.edge_node_id,
            self.death_payload(),
        )
    }

    fn sub_topics(&self) -> Vec<TopicFilter> {
        vec![
            TopicFilter::new(Topic::NodeTopic(NodeTopic::new(
                &self.version,
                &self.group_id,
                NodeMessageType::NCmd,
                &self.edge_node_id,
            ))),
            TopicFilter::new(Topic::DeviceTopic(DeviceTopic::new(
                &self.version,
                &self.group_id,
                DeviceMessageType::DCmd,
                &self.edge_node_id,
                "#",
            ))),
            TopicFilter::new(Topic::State(StateTopic::new(&self.version))),
        ]
    }
}

#[derive(Debug)]
struct SessionShutdown;

/// A handle for interacting with a running [Session].
///
/// The handle is the publish surface: it stamps sequence numbers, applies
/// per-publish compression options and builds the topic for each message
/// type. Handles are cheap to clone; all clones share the session's
/// counters.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<SessionState>,
    client: Arc<DynClient>,
    stop_tx: mpsc::Sender<SessionShutdown>,
}

impl SessionHandle {
    fn node_topic(&self, message_type: NodeMessageType) -> NodeTopic {
        NodeTopic::new(
            &self.state.version,
            &self.state.group_id,
            message_type,
            &self.state.edge_node_id,
        )
    }

    fn device_topic(&self, message_type: DeviceMessageType, device_id: &str) -> DeviceTopic {
        DeviceTopic::new(
            &self.state.version,
            &self.state.group_id,
            message_type,
            &self.state.edge_node_id,
            device_id,
        )
    }

    fn prepare(
        &self,
        mut payload: Payload,
        seq: u64,
        options: &PayloadOptions,
    ) -> Result<payload::Payload, PublishError> {
        payload.seq = Some(seq);
        let payload = maybe_compress_payload(payload, options)?;
        Ok(payload.try_into()?)
    }

    async fn publish_node(
        &self,
        topic: NodeTopic,
        payload: payload::Payload,
    ) -> Result<(), PublishError> {
        match self.client.publish_node_message(topic, payload).await {
            Ok(_) => Ok(()),
            Err(_) => Err(PublishError::Transport),
        }
    }

    async fn publish_device(
        &self,
        topic: DeviceTopic,
        payload: payload::Payload,
    ) -> Result<(), PublishError> {
        match self.client.publish_device_message(topic, payload).await {
            Ok(_) => Ok(()),
            Err(_) => Err(PublishError::Transport),
        }
    }

    /// Publish the node birth certificate.
    ///
    /// Resets the session sequence counter (the birth always carries seq 0)
    /// and appends the bdSeq metric as the trailing metric.
    pub async fn publish_node_birth(
        &self,
        mut payload: Payload,
        options: &PayloadOptions,
    ) -> Result<(), PublishError> {
        let seq = self.state.next_seq_after_reset();
        payload
            .metrics
            .push(Metric::new(BDSEQ, Value::UInt64(self.state.bdseq())));
        let wire = self.prepare(payload, seq, options)?;
        info!("Publishing node birth. node = {}", self.state.edge_node_id);
        self.publish_node(self.node_topic(NodeMessageType::NBirth), wire)
            .await
    }

    /// Publish a node data message
    pub async fn publish_node_data(
        &self,
        payload: Payload,
        options: &PayloadOptions,
    ) -> Result<(), PublishError> {
        let wire = self.prepare(payload, self.state.next_seq(), options)?;
        debug!("Publishing node data. node = {}", self.state.edge_node_id);
        self.publish_node(self.node_topic(NodeMessageType::NData), wire)
            .await
    }

    /// Publish a birth certificate for an attached device
    pub async fn publish_device_birth(
        &self,
        device_id: &str,
        payload: Payload,
        options: &PayloadOptions,
    ) -> Result<(), PublishError> {
        let wire = self.prepare(payload, self.state.next_seq(), options)?;
        info!("Publishing device birth. device = {device_id}");
        self.publish_device(self.device_topic(DeviceMessageType::DBirth, device_id), wire)
            .await
    }

    /// Publish a data message for an attached device
    pub async fn publish_device_data(
        &self,
        device_id: &str,
        payload: Payload,
        options: &PayloadOptions,
    ) -> Result<(), PublishError> {
        let wire = self.prepare(payload, self.state.next_seq(), options)?;
        debug!("Publishing device data. device = {device_id}");
        self.publish_device(self.device_topic(DeviceMessageType::DData, device_id), wire)
            .await
    }

    /// Publish a death certificate for an attached device
    pub async fn publish_device_death(
        &self,
        device_id: &str,
        payload: Payload,
    ) -> Result<(), PublishError> {
        let wire = self.prepare(payload, self.state.next_seq(), &PayloadOptions::default())?;
        info!("Publishing device death. device = {device_id}");
        self.publish_device(self.device_topic(DeviceMessageType::DDeath, device_id), wire)
            .await
    }

    /// Subscribe to an additional topic on this session's transport
    pub async fn subscribe(&self, topic: TopicFilter) -> Result<(), ()> {
        self.client.subscribe(topic).await
    }

    /// Stop the session.
    ///
    /// Publishes the node death certificate when the session was built with
    /// `publish_death`, then disconnects the transport. No further session
    /// events fire afterwards; in-flight publishes are not awaited.
    pub async fn stop(&self) {
        if self.state.publish_death {
            info!("Publishing node death. node = {}", self.state.edge_node_id);
            let topic = self.node_topic(NodeMessageType::NDeath);
            if self
                .client
                .try_publish_node_message(topic, self.state.death_payload())
                .await
                .is_err()
            {
                debug!("Unable to publish node death certificate on exit");
            }
        }
        _ = self.stop_tx.send(SessionShutdown).await;
        _ = self.client.disconnect().await;
    }
}

/// One logical Sparkplug session for one edge node.
///
/// See [SessionBuilder](crate::SessionBuilder) on how to create a session.
/// All protocol logic runs on [Session::run]'s single task, driven by
/// transport events; the caller consumes the [SessionEvent] stream and uses
/// the [SessionHandle] to publish.
pub struct Session {
    eventloop: Box<DynEventLoop>,
    client: Arc<DynClient>,
    state: Arc<SessionState>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    stop_rx: mpsc::Receiver<SessionShutdown>,
    ever_connected: bool,
}

impl Session {
    pub(crate) fn new_from_builder(
        builder: SessionBuilder,
    ) -> Result<(Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>), ConfigError> {
        let group_id = builder.group_id.ok_or(ConfigError::Missing("groupId"))?;
        let edge_node_id = builder.edge_node_id.ok_or(ConfigError::Missing("edgeNode"))?;
        edgeplug_types::utils::validate_name(&group_id)
            .map_err(|e| ConfigError::InvalidName("groupId", e))?;
        edgeplug_types::utils::validate_name(&edge_node_id)
            .map_err(|e| ConfigError::InvalidName("edgeNode", e))?;

        let (eventloop, client) = builder.eventloop_client;
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let state = Arc::new(SessionState {
            bdseq: AtomicU8::new(0),
            inner: Mutex::new(SessionStateInner {
                seq: 0,
                connected: false,
            }),
            group_id,
            edge_node_id,
            version: builder.version,
            publish_death: builder.publish_death,
        });

        let handle = SessionHandle {
            state: state.clone(),
            client: client.clone(),
            stop_tx,
        };

        let session = Session {
            eventloop,
            client,
            state,
            event_tx,
            stop_rx,
            ever_connected: false,
        };

        Ok((session, handle, event_rx))
    }

    fn emit(&self, event: SessionEvent) {
        _ = self.event_tx.send(event);
    }

    /// Run the session until [SessionHandle::stop] is called or the initial
    /// connection attempt fails
    pub async fn run(mut self) {
        info!("Session running. node = {}", self.state.edge_node_id);
        self.eventloop.set_last_will(self.state.create_last_will());

        loop {
            select! {
                event = self.eventloop.poll() => {
                    if !self.handle_event(event).await {
                        break;
                    }
                }
                Some(_) = self.stop_rx.recv() => break,
            }
        }
        info!("Session stopped. node = {}", self.state.edge_node_id);
    }

    async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Online => self.on_online().await,
            Event::Offline => self.on_offline(),
            Event::ConnectError { reason } => {
                self.emit(SessionEvent::Error { reason });
                return false;
            }
            Event::Node(message) => self.on_node_message(message),
            Event::Device(message) => self.on_device_message(message),
            Event::State { host_id, payload } => self.on_state_message(host_id, payload),
            Event::Message { topic, payload } => self.deliver_unclassified(topic, payload),
            Event::InvalidPublish { reason, .. } => self.emit(SessionEvent::InvalidMessage {
                reason: reason.to_string(),
            }),
        }
        true
    }

    async fn on_online(&mut self) {
        if self.state.connected_swap(true) {
            return;
        }
        info!("Session online. node = {}", self.state.edge_node_id);
        self.state.reset_seq();

        if self.client.subscribe_many(self.state.sub_topics()).await.is_err() {
            warn!("Failed to subscribe to command topics");
        }

        if self.ever_connected {
            self.emit(SessionEvent::Reconnect);
        }
        self.ever_connected = true;
        self.emit(SessionEvent::Connect);
        /* birth payloads are owned by the caller; signal that they should be
         * published now */
        self.emit(SessionEvent::Birth);
    }

    fn on_offline(&mut self) {
        /* a close while already disconnected is swallowed */
        if !self.state.connected_swap(false) {
            return;
        }
        info!("Session offline. node = {}", self.state.edge_node_id);
        /* the next birth/death pair must be distinguishable from this one */
        self.state.bdseq.fetch_add(1, Ordering::SeqCst);
        self.eventloop.set_last_will(self.state.create_last_will());
        self.emit(SessionEvent::Offline);
        self.emit(SessionEvent::Close);
    }

    fn decode_message_payload(&self, wire: payload::Payload) -> Result<Payload, String> {
        let decoded = Payload::try_from(wire).map_err(|e| e.to_string())?;
        maybe_decompress_payload(decoded).map_err(|e| e.to_string())
    }

    fn on_node_message(&self, message: NodeMessage) {
        let NodeMessage {
            group_id,
            node_id,
            message,
        } = message;
        let is_command = message.kind == MessageKind::Cmd
            && group_id == self.state.group_id
            && node_id == self.state.edge_node_id;
        let token = node_message_token(&message.kind);
        let decoded = match self.decode_message_payload(message.payload) {
            Ok(payload) => payload,
            Err(reason) => return self.emit(SessionEvent::InvalidMessage { reason }),
        };
        if is_command {
            self.emit(SessionEvent::NodeCommand { payload: decoded });
        } else {
            let topic = node_topic_raw(&self.state.version, &group_id, &token, &node_id);
            self.emit(SessionEvent::Message {
                topic,
                payload: decoded,
            });
        }
    }

    fn on_device_message(&self, message: DeviceMessage) {
        let DeviceMessage {
            group_id,
            node_id,
            device_id,
            message,
        } = message;
        let is_command = message.kind == MessageKind::Cmd
            && group_id == self.state.group_id
            && node_id == self.state.edge_node_id;
        let token = device_message_token(&message.kind);
        let decoded = match self.decode_message_payload(message.payload) {
            Ok(payload) => payload,
            Err(reason) => return self.emit(SessionEvent::InvalidMessage { reason }),
        };
        if is_command {
            self.emit(SessionEvent::DeviceCommand {
                device_id,
                payload: decoded,
            });
        } else {
            let topic =
                device_topic_raw(&self.state.version, &group_id, &token, &node_id, &device_id);
            self.emit(SessionEvent::Message {
                topic,
                payload: decoded,
            });
        }
    }

    fn on_state_message(&self, host_id: String, payload: StatePayload) {
        let (online, timestamp) = match payload {
            StatePayload::Online { timestamp } => (true, timestamp),
            StatePayload::Offline { timestamp } => (false, timestamp),
        };
        self.emit(SessionEvent::HostState {
            host_id,
            online,
            timestamp,
        });
    }

    fn deliver_unclassified(&self, topic: String, wire: payload::Payload) {
        match self.decode_message_payload(wire) {
            Ok(payload) => self.emit(SessionEvent::Message { topic, payload }),
            Err(reason) => self.emit(SessionEvent::InvalidMessage { reason }),
        }
    }
}

fn node_message_token(kind: &MessageKind) -> String {
    match kind {
        MessageKind::Birth => constants::NBIRTH.to_string(),
        MessageKind::Death => constants::NDEATH.to_string(),
        MessageKind::Data => constants::NDATA.to_string(),
        MessageKind::Cmd => constants::NCMD.to_string(),
        MessageKind::Other(token) => token.clone(),
    }
}

fn device_message_token(kind: &MessageKind) -> String {
    match kind {
        MessageKind::Birth => constants::DBIRTH.to_string(),
        MessageKind::Death => constants::DDEATH.to_string(),
        MessageKind::Data => constants::DDATA.to_string(),
        MessageKind::Cmd => constants::DCMD.to_string(),
        MessageKind::Other(token) => token.clone(),
    }
}
