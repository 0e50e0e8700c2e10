use bytes::{Buf, BufMut, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
};

#[derive(Debug, PartialEq, Eq)]
pub struct UnsubAckPacket {
    pub packet_id: u16,
}

const PACKET_TYPE: u8 = 0x0b;
const REMAINING_LEN: u32 = 2;

impl Encoder for UnsubAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(REMAINING_LEN).encode(buffer);
        self.packet_id.encode(buffer);
    }
}

impl Decoder for UnsubAckPacket {
    fn decode<T: Buf>(buffer: &mut T) -> courier_core::Result<Self> {
        buffer.advance(1);

        let remaining = VariableByteInteger::decode(buffer)?;
        if remaining.0 != REMAINING_LEN {
            return Err(Error::MalformedSize);
        }

        let packet_id = u16::decode(buffer)?;

        Ok(UnsubAckPacket { packet_id })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::unsuback::*;

    #[test]
    fn test_unsuback_encode_decode() {
        let expected = vec![0xb0, 0x02, 0x00, 0x02];

        let packet = UnsubAckPacket { packet_id: 2 };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);
        assert_eq!(encoded.to_vec(), expected);

        let mut bytes = Bytes::from(expected);
        let decoded = UnsubAckPacket::decode(&mut bytes).expect("Unexpected error");
        assert_eq!(decoded, packet);
    }
}
