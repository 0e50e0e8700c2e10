use core::mem;

#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::{BufMut, Bytes, BytesMut};

use courier_core::{
    codec::{Encoder, VariableByteInteger},
    protocol,
    qos::QoS,
};

#[derive(Default, Debug, PartialEq, Eq)]
pub struct ConnectFlags {
    pub user_name: bool,
    pub password: bool,
    pub will_retain: bool,
    pub will_qos: QoS,
    pub will_flag: bool,
    pub clean_session: bool,
}

impl Encoder for ConnectFlags {
    fn encode(&self, buffer: &mut BytesMut) {
        let mut flags: u8 = 0;

        if self.user_name {
            flags = 0b1000_0000;
        }

        if self.password {
            flags |= 0b0100_0000;
        }

        if self.will_retain {
            flags |= 0b0010_0000;
        }

        if self.will_flag {
            flags |= 0b0000_0100;
            flags |= (self.will_qos as u8) << 3;
        }

        if self.clean_session {
            flags |= 0b0000_0010;
        }

        buffer.put_u8(flags);
    }

    fn encoded_size(&self) -> usize {
        mem::size_of::<u8>()
    }
}

/// CONNECT payload strings, each written iff the matching flag is set.
/// The will topic and will payload must be both present or both absent.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ConnectPayload {
    pub client_id: String,
    pub will_topic: Option<String>,
    pub will_payload: Option<Bytes>,
    pub user_name: Option<String>,
    pub password: Option<Bytes>,
}

impl Encoder for ConnectPayload {
    fn encode(&self, buffer: &mut BytesMut) {
        self.client_id.encode(buffer);
        self.will_topic.encode(buffer);
        self.will_payload.encode(buffer);
        self.user_name.encode(buffer);
        self.password.encode(buffer);
    }

    fn encoded_size(&self) -> usize {
        let mut len = 0;

        len += self.client_id.encoded_size();
        len += self.will_topic.encoded_size();
        len += self.will_payload.encoded_size();
        len += self.user_name.encoded_size();
        len += self.password.encoded_size();

        len
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConnectPacket {
    pub flags: ConnectFlags,
    pub keep_alive: u16,
    pub payload: ConnectPayload,
}

const PACKET_TYPE: u8 = 0x01;

/// Bytes in the variable header: protocol name, level, flags, keep-alive
/// and the payload length field.
const VARIABLE_HEADER_LEN: usize = 12;

impl Encoder for ConnectPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        let payload_len = self.payload.encoded_size();

        // Fixed header
        buffer.put_u8(PACKET_TYPE << 4);
        VariableByteInteger((VARIABLE_HEADER_LEN + payload_len) as u32).encode(buffer);

        // Variable header
        protocol::PROTOCOL_NAME.encode(buffer);
        protocol::PROTOCOL_LEVEL.encode(buffer);
        self.flags.encode(buffer);
        self.keep_alive.encode(buffer);
        (payload_len as u16).encode(buffer);

        // Payload
        self.payload.encode(buffer);
    }
}

#[cfg(test)]
mod tests {
    use crate::connect::*;

    #[test]
    fn test_connect_packet_encoding() {
        let expected = vec![
            0x10, 0x18, 0x00, 0x04, 0x4d, 0x51, 0x54, 0x54, 0x04, 0x02, 0x01, 0x2c, 0x00, 0x0c,
            0x00, 0x0a, 0x63, 0x6f, 0x75, 0x72, 0x69, 0x65, 0x72, 0x5f, 0x76, 0x34,
        ];

        let flags = ConnectFlags {
            clean_session: true,
            ..Default::default()
        };

        let payload = ConnectPayload {
            client_id: String::from("courier_v4"),
            ..Default::default()
        };

        let packet = ConnectPacket {
            flags,
            keep_alive: protocol::KEEP_ALIVE_SECS,
            payload,
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        assert_eq!(encoded.to_vec(), expected);
    }

    #[test]
    fn test_connect_packet_with_will_and_credentials() {
        let flags = ConnectFlags {
            user_name: true,
            password: true,
            will_retain: true,
            will_qos: QoS::AtLeastOnce,
            will_flag: true,
            clean_session: true,
        };

        let payload = ConnectPayload {
            client_id: String::from("device-1"),
            will_topic: Some(String::from("status")),
            will_payload: Some(Bytes::from("offline")),
            user_name: Some(String::from("user")),
            password: Some(Bytes::from("secret")),
        };

        let packet = ConnectPacket {
            flags,
            keep_alive: protocol::KEEP_ALIVE_SECS,
            payload,
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        // user 0x80 | password 0x40 | will retain 0x20 | will QoS 1 0x08 |
        // will 0x04 | clean session 0x02
        assert_eq!(encoded[9], 0xee);

        // Payload: 8 + 6 + 7 + 4 + 6 bytes of strings plus five length
        // prefixes.
        let payload_len = 8 + 6 + 7 + 4 + 6 + 10;
        assert_eq!(encoded[1] as usize, 12 + payload_len);
        assert_eq!(
            u16::from_be_bytes([encoded[12], encoded[13]]) as usize,
            payload_len
        );
    }
}
