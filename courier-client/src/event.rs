use bytes::Bytes;
use courier_core::qos::QoS;

use crate::error::ClientError;

/// A message the broker delivered on a subscribed topic.
#[derive(Debug, Clone)]
pub struct Publication {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
}

/// Invoked from the worker task for every inbound publication. The
/// payload has already been drained from the transport, so a failing
/// handler cannot desynchronize the stream; its error is reported through
/// the error handler instead.
pub type PublishHandler =
    Box<dyn FnMut(Publication) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>;

/// Invoked from the worker task whenever a handler fails.
pub type ErrorHandler = Box<dyn FnMut(&ClientError) + Send>;
