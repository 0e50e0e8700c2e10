#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::{BufMut, BytesMut};

use courier_core::{
    codec::{Encoder, VariableByteInteger},
    qos::QoS,
};

use crate::SUBSCRIBE_PACKET_ID;

/// Subscribe request carrying a single topic filter.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscribePacket {
    pub packet_id: u16,
    pub topic_filter: String,
    pub qos: QoS,
}

const PACKET_TYPE: u8 = 0x08;
const FLAGS: u8 = 0x02;

impl SubscribePacket {
    pub fn new(topic_filter: impl Into<String>, qos: QoS) -> Self {
        Self {
            packet_id: SUBSCRIBE_PACKET_ID,
            topic_filter: topic_filter.into(),
            qos,
        }
    }
}

impl Encoder for SubscribePacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8((PACKET_TYPE << 4) | FLAGS);

        // Packet id, filter with its length prefix, requested QoS byte.
        let remaining = 2 + self.topic_filter.encoded_size() + 1;
        VariableByteInteger(remaining as u32).encode(buffer);

        self.packet_id.encode(buffer);
        self.topic_filter.encode(buffer);
        buffer.put_u8(self.qos as u8);
    }
}
