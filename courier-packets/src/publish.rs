#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
    qos::QoS,
};

use crate::PUBLISH_PACKET_ID;

#[derive(Debug, PartialEq, Eq)]
pub struct PublishPacket {
    pub topic: String,
    pub packet_id: Option<u16>,
    pub qos: QoS,
    pub payload: Bytes,
}

const PACKET_TYPE: u8 = 0x03;

impl PublishPacket {
    /// Builds an outbound publish. QoS above at-most-once carries the
    /// fixed client packet identifier.
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>, qos: QoS) -> Self {
        let packet_id = (qos > QoS::AtMostOnce).then_some(PUBLISH_PACKET_ID);

        Self {
            topic: topic.into(),
            packet_id,
            qos,
            payload: payload.into(),
        }
    }

    /// Decodes an inbound publish. Topics longer than `max_topic_len`
    /// bytes are rejected with `MalformedSize`.
    pub fn decode_bounded<T: Buf>(buffer: &mut T, max_topic_len: usize) -> courier_core::Result<Self> {
        let first = u8::decode(buffer)?;
        let qos = QoS::try_from((first >> 1) & 0x03)?;

        let remaining = VariableByteInteger::decode(buffer)?.0 as usize;
        if buffer.remaining() < remaining {
            return Err(Error::Incomplete);
        }

        let mut body = remaining;

        if body < 2 {
            return Err(Error::MalformedSize);
        }
        let topic_len = u16::decode(buffer)? as usize;
        body -= 2;

        if topic_len > max_topic_len || topic_len > body {
            return Err(Error::MalformedSize);
        }

        let topic = String::from_utf8(buffer.copy_to_bytes(topic_len).to_vec())
            .map_err(|_| Error::MalformedPacket)?;
        body -= topic_len;

        let packet_id = if qos > QoS::AtMostOnce {
            if body < 2 {
                return Err(Error::MalformedSize);
            }
            body -= 2;
            Some(u16::decode(buffer)?)
        } else {
            None
        };

        let payload = buffer.copy_to_bytes(body);

        Ok(PublishPacket {
            topic,
            packet_id,
            qos,
            payload,
        })
    }
}

impl Encoder for PublishPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8((PACKET_TYPE << 4) | ((self.qos as u8) << 1));

        let mut remaining = self.topic.encoded_size() + self.payload.len();
        if self.qos > QoS::AtMostOnce {
            remaining += 2;
        }
        VariableByteInteger(remaining as u32).encode(buffer);

        self.topic.encode(buffer);

        if let Some(packet_id) = self.packet_id {
            packet_id.encode(buffer);
        }

        buffer.extend_from_slice(&self.payload);
    }
}
