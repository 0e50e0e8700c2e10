use bytes::{Buf, BufMut, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
};

#[derive(Debug, PartialEq, Eq)]
pub struct PingRespPacket {}

const PACKET_TYPE: u8 = 0x0d;

impl Encoder for PingRespPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(0).encode(buffer);
    }
}

impl Decoder for PingRespPacket {
    fn decode<T: Buf>(buffer: &mut T) -> courier_core::Result<Self> {
        buffer.advance(1);

        let remaining = VariableByteInteger::decode(buffer)?;
        if remaining.0 != 0 {
            return Err(Error::MalformedSize);
        }

        Ok(PingRespPacket {})
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::pingresp::*;

    #[test]
    fn test_pingresp_decoding() {
        let mut bytes = Bytes::from(vec![0xd0, 0x00]);

        PingRespPacket::decode(&mut bytes).expect("Unexpected error");
    }

    #[test]
    fn test_pingresp_bad_remaining_length() {
        let mut bytes = Bytes::from(vec![0xd0, 0x01, 0x00]);

        assert_eq!(
            PingRespPacket::decode(&mut bytes),
            Err(Error::MalformedSize)
        );
    }
}
