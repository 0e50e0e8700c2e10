use courier_core::{codec::check_string_size, message::Message, protocol, qos::QoS};
use courier_packets::{
    connack::{ConnAckPacket, CONNECTION_ACCEPTED},
    connect::{ConnectFlags, ConnectPacket, ConnectPayload},
    disconnect::DisconnectPacket,
    pingreq::PingReqPacket,
    puback::PubAckPacket,
    publish::PublishPacket,
    pubrec::PubRecPacket,
    suback::{SubAckPacket, MAX_GRANTED_QOS},
    subscribe::SubscribePacket,
    unsubscribe::UnsubscribePacket,
    Packet, PacketType, PUBLISH_PACKET_ID, SUBSCRIBE_PACKET_ID, UNSUBSCRIBE_PACKET_ID,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, info_span, Instrument};

use crate::error::{ClientError, Result};
use crate::event::{ErrorHandler, Publication, PublishHandler};
use crate::options::{ConnectOptions, DEFAULT_CLIENT_ID};
use crate::session::{Pending, Reply, Session, Take};
use crate::transport::Transport;

/// Command sent to the client event loop.
enum Command {
    Connect {
        options: Option<ConnectOptions>,
        reply: Reply,
    },
    Disconnect {
        reply: Reply,
    },
    Ping {
        reply: Reply,
    },
    Publish {
        message: Message,
        reply: Reply,
    },
    Subscribe {
        message: Message,
        reply: Reply,
    },
    Unsubscribe {
        message: Message,
        reply: Reply,
    },
}

/// Handle to a running MQTT client.
///
/// Every operation sends one command to the worker task and blocks until
/// the worker posts the result, so at most one request is on the wire at
/// any time. Handles are cheap to clone; concurrent callers serialize on
/// the command channel.
#[derive(Clone)]
pub struct Client {
    command_tx: mpsc::Sender<Command>,
}

impl Client {
    /// Start a client over a bidirectional byte stream. The worker task
    /// is spawned onto the current tokio runtime.
    ///
    /// `on_publish` runs on the worker for every inbound publication.
    /// `on_error` runs on the worker for every handler failure; when
    /// `None`, errors are logged.
    pub fn start<S>(
        name: impl Into<String>,
        stream: S,
        on_publish: PublishHandler,
        on_error: Option<ErrorHandler>,
    ) -> Client
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_transport(name, Transport::new(stream), on_publish, on_error)
    }

    /// Start a client over an already constructed transport. Use this to
    /// hand in separate stream halves or a custom inbound topic bound.
    pub fn with_transport<R, W>(
        name: impl Into<String>,
        transport: Transport<R, W>,
        on_publish: PublishHandler,
        on_error: Option<ErrorHandler>,
    ) -> Client
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let name = name.into();
        let (command_tx, command_rx) = mpsc::channel(1);

        let on_error = on_error.unwrap_or_else(|| {
            Box::new(|e: &ClientError| error!(error = %e, "mqtt client error"))
        });

        let worker = Worker {
            transport,
            session: Session::Disconnected,
            on_publish,
            on_error,
        };

        let span = info_span!("mqtt_client", client = %name);
        tokio::spawn(worker.run(command_rx).instrument(span));

        Client { command_tx }
    }

    async fn request(&self, command: Command, reply_rx: oneshot::Receiver<Result<()>>) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ClientError::WorkerGone)?;

        reply_rx.await.map_err(|_| ClientError::WorkerGone)?
    }

    /// Establish a session with the broker. `None` connects with a clean
    /// session, no will and the default client id.
    pub async fn connect(&self, options: Option<ConnectOptions>) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Connect { options, reply }, reply_rx)
            .await
    }

    /// End the session. Resolves as soon as DISCONNECT is written.
    pub async fn disconnect(&self) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Disconnect { reply }, reply_rx).await
    }

    /// Send a ping and wait for the ping response. The client schedules
    /// no pings on its own; call this within the keep-alive interval.
    pub async fn ping(&self) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Ping { reply }, reply_rx).await
    }

    /// Publish an application message. QoS 0 resolves once the packet is
    /// written, QoS 1 once the broker acknowledges it. QoS 2 is not
    /// supported and fails with [`ClientError::UnsupportedQoS`].
    pub async fn publish(&self, message: Message) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Publish { message, reply }, reply_rx)
            .await
    }

    /// Subscribe to a single topic filter, with the requested QoS in
    /// `message.qos`. Resolves once the broker grants the subscription.
    pub async fn subscribe(&self, message: Message) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Subscribe { message, reply }, reply_rx)
            .await
    }

    /// Unsubscribe from a single topic filter.
    pub async fn unsubscribe(&self, message: Message) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(Command::Unsubscribe { message, reply }, reply_rx)
            .await
    }
}

/// The worker task: owns the transport and all mutable session state.
struct Worker<R, W> {
    transport: Transport<R, W>,
    session: Session,
    on_publish: PublishHandler,
    on_error: ErrorHandler,
}

/// One wakeup of the event loop.
enum Event {
    Command(Option<Command>),
    Inbound(Result<Option<Packet>>),
}

impl<R, W> Worker<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        loop {
            let event = tokio::select! {
                // Commands are only accepted while no request is waiting
                // for its response.
                command = command_rx.recv(), if self.session.idle() => {
                    Event::Command(command)
                }
                inbound = self.transport.read_packet() => Event::Inbound(inbound),
            };

            match event {
                Event::Command(Some(command)) => self.handle_command(command).await,
                Event::Command(None) => {
                    debug!("all client handles dropped, stopping");
                    break;
                }
                Event::Inbound(Ok(Some(packet))) => {
                    if let Err(e) = self.handle_server_packet(packet).await {
                        (self.on_error)(&e);
                    }
                }
                Event::Inbound(Ok(None)) => {
                    info!("connection closed by the server");
                    self.fail_pending(ClientError::TransportClosed);
                    break;
                }
                Event::Inbound(Err(e)) => {
                    let fatal = matches!(
                        e,
                        ClientError::Io(_)
                            | ClientError::TransportClosed
                            | ClientError::Packet(courier_core::error::Error::MalformedLength)
                    );
                    self.fail_pending(e);
                    if fatal {
                        break;
                    }
                }
            }
        }
    }

    /// Completes one application call, reporting failures through the
    /// error handler as well. Every accepted command ends up here (or in
    /// [`Session::park`]) exactly once.
    fn complete(&mut self, reply: Reply, result: Result<()>) {
        if let Err(ref e) = result {
            (self.on_error)(e);
        }
        let _ = reply.send(result);
    }

    /// Reports a transport-level failure and releases whatever caller was
    /// blocked on it.
    fn fail_pending(&mut self, error: ClientError) {
        (self.on_error)(&error);
        if let Some(reply) = self.session.take_pending() {
            let _ = reply.send(Err(error));
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { options, reply } => self.handle_connect(options, reply).await,
            Command::Disconnect { reply } => self.handle_disconnect(reply).await,
            Command::Ping { reply } => self.handle_ping(reply).await,
            Command::Publish { message, reply } => self.handle_publish(message, reply).await,
            Command::Subscribe { message, reply } => self.handle_subscribe(message, reply).await,
            Command::Unsubscribe { message, reply } => {
                self.handle_unsubscribe(message, reply).await
            }
        }
    }

    async fn handle_connect(&mut self, options: Option<ConnectOptions>, reply: Reply) {
        if self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        let packet = match build_connect_packet(options) {
            Ok(packet) => packet,
            Err(e) => return self.complete(reply, Err(e)),
        };

        if let Err(e) = self.transport.write_packet(&Packet::Connect(packet)).await {
            return self.complete(reply, Err(e));
        }

        self.session = Session::Connecting(reply);
    }

    async fn handle_disconnect(&mut self, reply: Reply) {
        if !self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        let result = self
            .transport
            .write_packet(&Packet::Disconnect(DisconnectPacket {}))
            .await;

        // The session ends whether or not the packet made it out.
        self.session = Session::Disconnected;
        info!("disconnected");

        self.complete(reply, result);
    }

    async fn handle_ping(&mut self, reply: Reply) {
        if !self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        if let Err(e) = self
            .transport
            .write_packet(&Packet::PingReq(PingReqPacket {}))
            .await
        {
            return self.complete(reply, Err(e));
        }

        self.session.park(Pending::Ping(reply));
    }

    async fn handle_publish(&mut self, message: Message, reply: Reply) {
        if !self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        if check_string_size(message.topic.len()).is_err() {
            return self.complete(reply, Err(ClientError::InvalidTopic(message.topic)));
        }

        if message.qos == QoS::ExactlyOnce {
            return self.complete(reply, Err(ClientError::UnsupportedQoS));
        }

        let qos = message.qos;
        let packet = PublishPacket::new(message.topic, message.payload, qos);

        if let Err(e) = self.transport.write_packet(&Packet::Publish(packet)).await {
            return self.complete(reply, Err(e));
        }

        if qos == QoS::AtMostOnce {
            self.complete(reply, Ok(()));
        } else {
            self.session.park(Pending::Publish(reply));
        }
    }

    async fn handle_subscribe(&mut self, message: Message, reply: Reply) {
        if !self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        if check_string_size(message.topic.len()).is_err() {
            return self.complete(reply, Err(ClientError::InvalidTopic(message.topic)));
        }

        let packet = SubscribePacket::new(message.topic, message.qos);

        if let Err(e) = self
            .transport
            .write_packet(&Packet::Subscribe(packet))
            .await
        {
            return self.complete(reply, Err(e));
        }

        self.session.park(Pending::Subscribe(reply));
    }

    async fn handle_unsubscribe(&mut self, message: Message, reply: Reply) {
        if !self.session.is_connected() {
            return self.complete(reply, Err(ClientError::WrongState));
        }

        if check_string_size(message.topic.len()).is_err() {
            return self.complete(reply, Err(ClientError::InvalidTopic(message.topic)));
        }

        let packet = UnsubscribePacket::new(message.topic);

        if let Err(e) = self
            .transport
            .write_packet(&Packet::Unsubscribe(packet))
            .await
        {
            return self.complete(reply, Err(e));
        }

        self.session.park(Pending::Unsubscribe(reply));
    }

    async fn handle_server_packet(&mut self, packet: Packet) -> Result<()> {
        match packet {
            Packet::ConnAck(ack) => self.on_connack(ack),
            Packet::PubAck(ack) => {
                let result = check_packet_id(PUBLISH_PACKET_ID, ack.packet_id);
                self.on_response(PacketType::PubAck, result)
            }
            Packet::SubAck(ack) => {
                let result = check_suback(&ack);
                self.on_response(PacketType::SubAck, result)
            }
            Packet::UnsubAck(ack) => {
                let result = check_packet_id(UNSUBSCRIBE_PACKET_ID, ack.packet_id);
                self.on_response(PacketType::UnsubAck, result)
            }
            Packet::PingResp(_) => self.on_response(PacketType::PingResp, Ok(())),
            Packet::Publish(publish) => self.on_publish_packet(publish).await,
            // The outbound QoS 2 flow is not driven; its acknowledgements
            // are accepted and dropped.
            Packet::PubRec(p) => {
                debug!(packet_id = p.packet_id, "ignoring pubrec");
                Ok(())
            }
            Packet::PubRel(p) => {
                debug!(packet_id = p.packet_id, "ignoring pubrel");
                Ok(())
            }
            Packet::PubComp(p) => {
                debug!(packet_id = p.packet_id, "ignoring pubcomp");
                Ok(())
            }
            other => Err(ClientError::Packet(
                courier_core::error::Error::UnexpectedPacket(other.packet_type() as u8),
            )),
        }
    }

    fn on_connack(&mut self, ack: ConnAckPacket) -> Result<()> {
        match self.session.take_response(PacketType::ConnAck) {
            Take::Matched(reply) => {
                let result = check_connack(&ack);
                if result.is_ok() {
                    self.session = Session::Connected { pending: None };
                    info!("connected");
                }
                self.complete(reply, result);
                Ok(())
            }
            Take::Mismatched(reply) => {
                self.complete(reply, Err(ClientError::UnexpectedResponse(PacketType::ConnAck)));
                Ok(())
            }
            Take::Unsolicited => Err(ClientError::UnexpectedResponse(PacketType::ConnAck)),
        }
    }

    /// Routes a validated response to the caller it belongs to. The
    /// validation result only reaches a matched caller; a mismatch turns
    /// into `UnexpectedResponse` for whichever caller was pending, and an
    /// unsolicited response is reported without touching any caller.
    fn on_response(&mut self, response: PacketType, result: Result<()>) -> Result<()> {
        match self.session.take_response(response) {
            Take::Matched(reply) => {
                self.complete(reply, result);
                Ok(())
            }
            Take::Mismatched(reply) => {
                self.complete(reply, Err(ClientError::UnexpectedResponse(response)));
                Ok(())
            }
            Take::Unsolicited => Err(ClientError::UnexpectedResponse(response)),
        }
    }

    async fn on_publish_packet(&mut self, publish: PublishPacket) -> Result<()> {
        match (publish.qos, publish.packet_id) {
            (QoS::AtLeastOnce, Some(packet_id)) => {
                self.transport
                    .write_packet(&Packet::PubAck(PubAckPacket { packet_id }))
                    .await?;
            }
            (QoS::ExactlyOnce, Some(packet_id)) => {
                self.transport
                    .write_packet(&Packet::PubRec(PubRecPacket { packet_id }))
                    .await?;
            }
            _ => {}
        }

        debug!(
            topic = %publish.topic,
            qos = %publish.qos,
            size = publish.payload.len(),
            "inbound publish"
        );

        let publication = Publication {
            topic: publish.topic,
            payload: publish.payload,
            qos: publish.qos,
        };

        (self.on_publish)(publication).map_err(ClientError::Callback)
    }
}

fn check_connack(ack: &ConnAckPacket) -> Result<()> {
    if ack.session_present {
        return Err(ClientError::SessionPresent);
    }

    if ack.return_code != CONNECTION_ACCEPTED {
        return Err(ClientError::ConnectRejected(ack.return_code));
    }

    Ok(())
}

fn check_packet_id(expected: u16, actual: u16) -> Result<()> {
    if actual != expected {
        return Err(ClientError::PacketIdMismatch { expected, actual });
    }

    Ok(())
}

fn check_suback(ack: &SubAckPacket) -> Result<()> {
    check_packet_id(SUBSCRIBE_PACKET_ID, ack.packet_id)?;

    if ack.return_code > MAX_GRANTED_QOS {
        return Err(ClientError::SubscribeRejected(ack.return_code));
    }

    Ok(())
}

fn build_connect_packet(options: Option<ConnectOptions>) -> Result<ConnectPacket> {
    let options = options.unwrap_or_default();

    let client_id = match options.client_id {
        Some(id) => {
            check_string_size(id.len())
                .map_err(|_| ClientError::InvalidArgument("client id must be 1-65535 bytes"))?;
            id
        }
        None => String::from(DEFAULT_CLIENT_ID),
    };

    if let Some(ref will) = options.will {
        check_string_size(will.topic.len())
            .map_err(|_| ClientError::InvalidArgument("will topic must be 1-65535 bytes"))?;
        check_string_size(will.payload.len())
            .map_err(|_| ClientError::InvalidArgument("will payload must be 1-65535 bytes"))?;
    }

    if let Some(ref user_name) = options.user_name {
        check_string_size(user_name.len())
            .map_err(|_| ClientError::InvalidArgument("user name must be 1-65535 bytes"))?;
    }

    if let Some(ref password) = options.password {
        check_string_size(password.len())
            .map_err(|_| ClientError::InvalidArgument("password must be 1-65535 bytes"))?;
    }

    let flags = ConnectFlags {
        user_name: options.user_name.is_some(),
        password: options.password.is_some(),
        will_retain: options.will.as_ref().map(|w| w.retain).unwrap_or(false),
        will_qos: options
            .will
            .as_ref()
            .map(|w| w.qos)
            .unwrap_or(QoS::AtMostOnce),
        will_flag: options.will.is_some(),
        // Session resumption is not supported.
        clean_session: true,
    };

    let payload = ConnectPayload {
        client_id,
        will_topic: options.will.as_ref().map(|w| w.topic.clone()),
        will_payload: options.will.map(|w| w.payload),
        user_name: options.user_name,
        password: options.password,
    };

    Ok(ConnectPacket {
        flags,
        keep_alive: protocol::KEEP_ALIVE_SECS,
        payload,
    })
}
