use bytes::{Buf, BufMut, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
};

/// CONNACK return code for an accepted connection.
pub const CONNECTION_ACCEPTED: u8 = 0x00;

#[derive(Debug, PartialEq, Eq)]
pub struct ConnAckPacket {
    pub session_present: bool,
    pub return_code: u8,
}

const PACKET_TYPE: u8 = 0x02;
const REMAINING_LEN: u32 = 2;

impl Encoder for ConnAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger(REMAINING_LEN).encode(buffer);
        buffer.put_u8(self.session_present as u8);
        buffer.put_u8(self.return_code);
    }
}

impl Decoder for ConnAckPacket {
    fn decode<T: Buf>(buffer: &mut T) -> courier_core::Result<Self> {
        buffer.advance(1);

        let remaining = VariableByteInteger::decode(buffer)?;
        if remaining.0 != REMAINING_LEN {
            return Err(Error::MalformedSize);
        }

        let flags = u8::decode(buffer)?;
        if (flags & 0b1111_1110) != 0 {
            return Err(Error::MalformedPacket);
        }

        let return_code = u8::decode(buffer)?;

        Ok(ConnAckPacket {
            session_present: (flags & 0b0000_0001) != 0,
            return_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::connack::*;

    #[test]
    fn test_connack_accepted() {
        let mut bytes = Bytes::from(vec![0x20, 0x02, 0x00, 0x00]);

        let packet = ConnAckPacket::decode(&mut bytes).expect("Unexpected error");
        assert!(!packet.session_present);
        assert_eq!(packet.return_code, CONNECTION_ACCEPTED);
    }

    #[test]
    fn test_connack_refused() {
        let mut bytes = Bytes::from(vec![0x20, 0x02, 0x00, 0x05]);

        let packet = ConnAckPacket::decode(&mut bytes).expect("Unexpected error");
        assert_eq!(packet.return_code, 0x05);
    }

    #[test]
    fn test_connack_bad_remaining_length() {
        let mut bytes = Bytes::from(vec![0x20, 0x03, 0x00, 0x00, 0x00]);

        assert_eq!(ConnAckPacket::decode(&mut bytes), Err(Error::MalformedSize));
    }

    #[test]
    fn test_connack_reserved_flags() {
        let mut bytes = Bytes::from(vec![0x20, 0x02, 0x02, 0x00]);

        assert_eq!(
            ConnAckPacket::decode(&mut bytes),
            Err(Error::MalformedPacket)
        );
    }

    #[test]
    fn test_connack_encode_decode() {
        let packet = ConnAckPacket {
            session_present: false,
            return_code: CONNECTION_ACCEPTED,
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);
        assert_eq!(encoded.to_vec(), vec![0x20, 0x02, 0x00, 0x00]);

        let decoded = ConnAckPacket::decode(&mut encoded).expect("Unexpected error");
        assert_eq!(decoded, packet);
    }
}
