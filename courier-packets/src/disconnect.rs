use bytes::{BufMut, BytesMut};

use courier_core::codec::{Encoder, VariableByteInteger};

#[derive(Debug, PartialEq, Eq)]
pub struct DisconnectPacket {}

const PACKET_TYPE: u8 = 0x0e;

impl Encoder for DisconnectPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(0).encode(buffer);
    }
}
