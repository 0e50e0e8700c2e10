use courier_packets::PacketType;
use thiserror::Error;

/// Errors that can occur in the MQTT client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("packet error: {0}")]
    Packet(#[from] courier_core::error::Error),

    #[error("invalid topic: {0:?}")]
    InvalidTopic(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("operation is not valid in the current session state")]
    WrongState,

    #[error("unexpected {0} from the server")]
    UnexpectedResponse(PacketType),

    #[error("packet identifier mismatch: expected {expected}, got {actual}")]
    PacketIdMismatch { expected: u16, actual: u16 },

    #[error("connection refused by the server: return code {0}")]
    ConnectRejected(u8),

    #[error("server indicated a resumed session on a clean-session connect")]
    SessionPresent,

    #[error("subscription rejected: return code {0}")]
    SubscribeRejected(u8),

    #[error("QoS 2 publishing is not supported")]
    UnsupportedQoS,

    #[error("transport closed")]
    TransportClosed,

    #[error("client worker has stopped")]
    WorkerGone,

    #[error("publish callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ClientError>;
