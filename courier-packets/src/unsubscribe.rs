#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::{BufMut, BytesMut};

use courier_core::codec::{Encoder, VariableByteInteger};

use crate::UNSUBSCRIBE_PACKET_ID;

/// Unsubscribe request carrying a single topic filter.
#[derive(Debug, PartialEq, Eq)]
pub struct UnsubscribePacket {
    pub packet_id: u16,
    pub topic_filter: String,
}

const PACKET_TYPE: u8 = 0x0a;
const FLAGS: u8 = 0x02;

impl UnsubscribePacket {
    pub fn new(topic_filter: impl Into<String>) -> Self {
        Self {
            packet_id: UNSUBSCRIBE_PACKET_ID,
            topic_filter: topic_filter.into(),
        }
    }
}

impl Encoder for UnsubscribePacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8((PACKET_TYPE << 4) | FLAGS);

        let remaining = 2 + self.topic_filter.encoded_size();
        VariableByteInteger(remaining as u32).encode(buffer);

        self.packet_id.encode(buffer);
        self.topic_filter.encode(buffer);
    }
}

#[cfg(test)]
mod tests {
    use crate::unsubscribe::*;

    #[test]
    fn test_unsubscribe_encoding() {
        let expected = vec![0xa2, 0x05, 0x00, 0x02, 0x00, 0x01, 0x78];

        let packet = UnsubscribePacket::new("x");

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        assert_eq!(encoded.to_vec(), expected);
    }
}
