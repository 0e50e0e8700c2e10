use bytes::{Buf, BufMut, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
};

#[derive(Debug, PartialEq, Eq)]
pub struct PubCompPacket {
    pub packet_id: u16,
}

const PACKET_TYPE: u8 = 0x07;
const REMAINING_LEN: u32 = 2;

impl Encoder for PubCompPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(REMAINING_LEN).encode(buffer);
        self.packet_id.encode(buffer);
    }
}

impl Decoder for PubCompPacket {
    fn decode<T: Buf>(buffer: &mut T) -> courier_core::Result<Self> {
        buffer.advance(1);

        let remaining = VariableByteInteger::decode(buffer)?;
        if remaining.0 != REMAINING_LEN {
            return Err(Error::MalformedSize);
        }

        let packet_id = u16::decode(buffer)?;

        Ok(PubCompPacket { packet_id })
    }
}
