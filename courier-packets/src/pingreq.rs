use bytes::{BufMut, BytesMut};

use courier_core::codec::{Encoder, VariableByteInteger};

#[derive(Debug, PartialEq, Eq)]
pub struct PingReqPacket {}

const PACKET_TYPE: u8 = 0x0c;

impl Encoder for PingReqPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(0).encode(buffer);
    }
}
