use bytes::{Buf, BufMut, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
};

/// Granted-QoS code signalling a rejected subscription. Any code above
/// [`MAX_GRANTED_QOS`] is a failure.
pub const MAX_GRANTED_QOS: u8 = 2;

#[derive(Debug, PartialEq, Eq)]
pub struct SubAckPacket {
    pub packet_id: u16,
    pub return_code: u8,
}

const PACKET_TYPE: u8 = 0x09;
const REMAINING_LEN: u32 = 3;

impl Encoder for SubAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(REMAINING_LEN).encode(buffer);
        self.packet_id.encode(buffer);
        buffer.put_u8(self.return_code);
    }
}

impl Decoder for SubAckPacket {
    fn decode<T: Buf>(buffer: &mut T) -> courier_core::Result<Self> {
        buffer.advance(1);

        let remaining = VariableByteInteger::decode(buffer)?;
        if remaining.0 != REMAINING_LEN {
            return Err(Error::MalformedSize);
        }

        let packet_id = u16::decode(buffer)?;
        let return_code = u8::decode(buffer)?;

        Ok(SubAckPacket {
            packet_id,
            return_code,
        })
    }
}
