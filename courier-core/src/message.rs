#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::Bytes;

use crate::qos::QoS;

/// An application message: the argument to publish, subscribe and
/// unsubscribe calls. For subscribe and unsubscribe the topic carries the
/// filter and the payload is ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>, qos: QoS) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos,
        }
    }

    /// A message holding only a topic filter, for subscribe and
    /// unsubscribe.
    pub fn filter(topic: impl Into<String>, qos: QoS) -> Self {
        Self {
            topic: topic.into(),
            payload: Bytes::new(),
            qos,
        }
    }
}
