//! MQTT 3.1.1 control packets.
//!
//! One module per control packet. Client-to-server packets implement
//! [`Encoder`]; server-to-client packets implement [`Decoder`] (and
//! `Encoder` too, which test fixtures use to play the server side).
//! [`Packet::check`] and [`Packet::parse`] provide the framing layer on
//! top of a byte buffer.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod pingreq;
pub mod pingresp;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

use core::fmt;

use bytes::{Buf, BytesMut};

use courier_core::{
    codec::{Decoder, Encoder, VariableByteInteger},
    error::Error,
    Result,
};

use crate::{
    connack::ConnAckPacket, connect::ConnectPacket, disconnect::DisconnectPacket,
    pingreq::PingReqPacket, pingresp::PingRespPacket, puback::PubAckPacket,
    pubcomp::PubCompPacket, publish::PublishPacket, pubrec::PubRecPacket, pubrel::PubRelPacket,
    suback::SubAckPacket, subscribe::SubscribePacket, unsuback::UnsubAckPacket,
    unsubscribe::UnsubscribePacket,
};

/// Packet identifier the client uses for outbound publish packets.
pub const PUBLISH_PACKET_ID: u16 = 1;

/// Packet identifier the client uses for subscribe packets.
pub const SUBSCRIBE_PACKET_ID: u16 = 1;

/// Packet identifier the client uses for unsubscribe packets.
pub const UNSUBSCRIBE_PACKET_ID: u16 = 2;

#[derive(PartialEq, Eq, Debug)]
pub enum Packet {
    Connect(ConnectPacket),
    ConnAck(ConnAckPacket),
    Publish(PublishPacket),
    PubAck(PubAckPacket),
    PubRec(PubRecPacket),
    PubRel(PubRelPacket),
    PubComp(PubCompPacket),
    Subscribe(SubscribePacket),
    SubAck(SubAckPacket),
    Unsubscribe(UnsubscribePacket),
    UnsubAck(UnsubAckPacket),
    PingReq(PingReqPacket),
    PingResp(PingRespPacket),
    Disconnect(DisconnectPacket),
}

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PacketType {
    Connect = 0x01,
    ConnAck,
    Publish,
    PubAck,
    PubRec,
    PubRel,
    PubComp,
    Subscribe,
    SubAck,
    Unsubscribe,
    UnsubAck,
    PingReq,
    PingResp,
    Disconnect,
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        use PacketType::*;

        let res = match value {
            0x01 => Connect,
            0x02 => ConnAck,
            0x03 => Publish,
            0x04 => PubAck,
            0x05 => PubRec,
            0x06 => PubRel,
            0x07 => PubComp,
            0x08 => Subscribe,
            0x09 => SubAck,
            0x0a => Unsubscribe,
            0x0b => UnsubAck,
            0x0c => PingReq,
            0x0d => PingResp,
            0x0e => Disconnect,
            _ => return Err(Error::MalformedPacket),
        };

        Ok(res)
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PacketType::*;

        let name = match self {
            Connect => "connect",
            ConnAck => "connack",
            Publish => "publish",
            PubAck => "puback",
            PubRec => "pubrec",
            PubRel => "pubrel",
            PubComp => "pubcomp",
            Subscribe => "subscribe",
            SubAck => "suback",
            Unsubscribe => "unsubscribe",
            UnsubAck => "unsuback",
            PingReq => "pingreq",
            PingResp => "pingresp",
            Disconnect => "disconnect",
        };

        write!(f, "{}", name)
    }
}

impl Packet {
    /// Checks whether `src` starts with a complete frame. Returns the
    /// total frame size (fixed header included) once the length field is
    /// readable, `None` while it is not.
    pub fn check(src: &[u8]) -> Result<Option<usize>> {
        let mut peeker = src;

        if !peeker.has_remaining() {
            return Ok(None);
        }

        peeker.advance(1);

        match VariableByteInteger::decode(&mut peeker) {
            Ok(remaining) => Ok(Some(1 + remaining.encoded_size() + remaining.0 as usize)),
            Err(Error::Incomplete) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parses one server-to-client frame. `src` must hold exactly the
    /// frame returned by [`Packet::check`]. Inbound topics longer than
    /// `max_topic_len` bytes are rejected with `MalformedSize`.
    pub fn parse(src: &mut BytesMut, max_topic_len: usize) -> Result<Packet> {
        use Packet::*;

        let packet_type = match src.first() {
            Some(byte) => *byte >> 4,
            None => return Err(Error::Incomplete),
        };

        let packet = match PacketType::try_from(packet_type)? {
            PacketType::ConnAck => ConnAck(ConnAckPacket::decode(src)?),
            PacketType::Publish => Publish(PublishPacket::decode_bounded(src, max_topic_len)?),
            PacketType::PubAck => PubAck(PubAckPacket::decode(src)?),
            PacketType::PubRec => PubRec(PubRecPacket::decode(src)?),
            PacketType::PubRel => PubRel(PubRelPacket::decode(src)?),
            PacketType::PubComp => PubComp(PubCompPacket::decode(src)?),
            PacketType::SubAck => SubAck(SubAckPacket::decode(src)?),
            PacketType::UnsubAck => UnsubAck(UnsubAckPacket::decode(src)?),
            PacketType::PingResp => PingResp(PingRespPacket::decode(src)?),
            other => return Err(Error::UnexpectedPacket(other as u8)),
        };

        Ok(packet)
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PubAck(_) => PacketType::PubAck,
            Packet::PubRec(_) => PacketType::PubRec,
            Packet::PubRel(_) => PacketType::PubRel,
            Packet::PubComp(_) => PacketType::PubComp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::UnsubAck(_) => PacketType::UnsubAck,
            Packet::PingReq(_) => PacketType::PingReq,
            Packet::PingResp(_) => PacketType::PingResp,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }
}

impl Encoder for Packet {
    fn encode(&self, buffer: &mut BytesMut) {
        use Packet::*;

        match self {
            Connect(p) => p.encode(buffer),
            ConnAck(p) => p.encode(buffer),
            Publish(p) => p.encode(buffer),
            PubAck(p) => p.encode(buffer),
            PubRec(p) => p.encode(buffer),
            PubRel(p) => p.encode(buffer),
            PubComp(p) => p.encode(buffer),
            Subscribe(p) => p.encode(buffer),
            SubAck(p) => p.encode(buffer),
            Unsubscribe(p) => p.encode(buffer),
            UnsubAck(p) => p.encode(buffer),
            PingReq(p) => p.encode(buffer),
            PingResp(p) => p.encode(buffer),
            Disconnect(p) => p.encode(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_incomplete_and_complete() {
        assert_eq!(Packet::check(&[]).unwrap(), None);
        assert_eq!(Packet::check(&[0x20]).unwrap(), None);
        assert_eq!(Packet::check(&[0x20, 0x02]).unwrap(), Some(4));
        // A long length field is sized before the body has arrived.
        assert_eq!(Packet::check(&[0x30, 0x80, 0x01]).unwrap(), Some(131));
    }

    #[test]
    fn test_check_malformed_length() {
        let res = Packet::check(&[0x30, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(res, Err(Error::MalformedLength));
    }

    #[test]
    fn test_parse_rejects_client_only_types() {
        let mut src = BytesMut::from(&[0x10, 0x00][..]);
        assert_eq!(Packet::parse(&mut src, 128), Err(Error::UnexpectedPacket(1)));
    }

    #[test]
    fn test_packet_type_names() {
        assert_eq!(PacketType::Connect.to_string(), "connect");
        assert_eq!(PacketType::PingResp.to_string(), "pingresp");
        assert_eq!(PacketType::Disconnect.to_string(), "disconnect");
    }
}
