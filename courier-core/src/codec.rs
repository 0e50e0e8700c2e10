use core::mem;

#[cfg(not(feature = "std"))]
use alloc::string::String;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::Error;

pub trait Decoder {
    fn decode<T>(buffer: &mut T) -> crate::Result<Self>
    where
        Self: Sized,
        T: Buf;
}

pub trait Encoder {
    fn encode(&self, buffer: &mut BytesMut);
    fn encoded_size(&self) -> usize {
        mem::size_of_val(self)
    }
}

/// Largest value a variable length field can carry (four bytes of
/// continuation).
pub const VAR_INT_MAX: u32 = 268_435_455;

fn encode_var_byte_integer(value: u32, encoded: &mut BytesMut) {
    let mut x = value;

    loop {
        let mut encoded_byte: u8 = (x % 128) as u8;
        x /= 128;

        if x > 0 {
            encoded_byte |= 0b1000_0000;
        }

        encoded.put_u8(encoded_byte);

        if x == 0 {
            break;
        }
    }
}

fn decode_var_byte_integer<T: Buf>(encoded: &mut T) -> crate::Result<VariableByteInteger> {
    let mut multiplier = 1;
    let mut value: u32 = 0;

    loop {
        if encoded.has_remaining() {
            let encoded_byte = encoded.get_u8();

            // A fifth continuation byte would overflow the field.
            if multiplier > (128 * 128 * 128) {
                return Err(Error::MalformedLength);
            }

            value += (encoded_byte & 0b0111_1111) as u32 * multiplier;
            multiplier *= 128;

            if (encoded_byte & 0b1000_0000) == 0 {
                break;
            }
        } else {
            return Err(Error::Incomplete);
        }
    }

    Ok(VariableByteInteger(value))
}

/// The base-128 variable length integer used by the fixed header.
#[derive(PartialEq, Eq, Debug, Default)]
pub struct VariableByteInteger(pub u32);

impl Encoder for VariableByteInteger {
    fn encode(&self, buffer: &mut BytesMut) {
        encode_var_byte_integer(self.0, buffer);
    }

    fn encoded_size(&self) -> usize {
        match self.0 {
            0..=127 => 1,
            128..=16383 => 2,
            16384..=2097151 => 3,
            2097152..=268435455 => 4,
            _ => unreachable!(),
        }
    }
}

impl Decoder for VariableByteInteger {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        decode_var_byte_integer(buffer)
    }
}

/// Checks the bounds a length-prefixed string must satisfy before it is
/// written to the wire. Payload bytes are exempt; topics, filters, client
/// identifiers and credentials are not.
pub fn check_string_size(len: usize) -> crate::Result<()> {
    if len == 0 || len > u16::MAX as usize {
        return Err(Error::InvalidLength);
    }

    Ok(())
}

impl Encoder for String {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.len() as u16);
        buffer.put(self.as_bytes());
    }

    fn encoded_size(&self) -> usize {
        self.len() + mem::size_of::<u16>()
    }
}

impl Decoder for String {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if buffer.remaining() < 2 {
            return Err(Error::Incomplete);
        }

        let length = buffer.get_u16();
        if buffer.remaining() < length as usize {
            return Err(Error::MalformedSize);
        }

        let bytes = buffer.copy_to_bytes(length.into());

        match String::from_utf8(bytes.to_vec()) {
            Err(_) => Err(Error::MalformedPacket),
            Ok(s) => Ok(s),
        }
    }
}

impl Encoder for &str {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.len() as u16);
        buffer.put(self.as_bytes());
    }

    fn encoded_size(&self) -> usize {
        self.len() + mem::size_of::<u16>()
    }
}

impl Encoder for u8 {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(*self);
    }
}

impl Decoder for u8 {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if !buffer.has_remaining() {
            return Err(Error::Incomplete);
        }

        Ok(buffer.get_u8())
    }
}

impl Encoder for u16 {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(*self);
    }
}

impl Decoder for u16 {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if buffer.remaining() < 2 {
            return Err(Error::Incomplete);
        }

        Ok(buffer.get_u16())
    }
}

impl Encoder for Bytes {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.len() as u16);
        buffer.extend_from_slice(self);
    }

    fn encoded_size(&self) -> usize {
        mem::size_of::<u16>() + self.len()
    }
}

impl Decoder for Bytes {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        if buffer.remaining() < 2 {
            return Err(Error::Incomplete);
        }

        let length = buffer.get_u16();
        if buffer.remaining() < length as usize {
            return Err(Error::MalformedSize);
        }

        Ok(buffer.copy_to_bytes(length.into()))
    }
}

impl<T> Encoder for Option<T>
where
    T: Encoder,
{
    fn encode(&self, buffer: &mut BytesMut) {
        match self {
            Some(v) => v.encode(buffer),
            None => {}
        }
    }

    fn encoded_size(&self) -> usize {
        match self {
            Some(v) => v.encoded_size(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{codec::*, error::Error};

    #[test]
    fn test_var_byte_integer_encode_decode() -> crate::Result<()> {
        let value: u16 = 325;
        let mut encoded = BytesMut::new();

        VariableByteInteger(value as u32).encode(&mut encoded);
        assert_eq!(encoded, Bytes::from(vec![0xc5, 0x02]));

        let decoded = VariableByteInteger::decode(&mut encoded)?;
        assert_eq!(decoded.0 as u16, value);

        Ok(())
    }

    #[test]
    fn test_var_byte_integer_length_classes() {
        for (value, expected_len) in [
            (0u32, 1usize),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
            (VAR_INT_MAX, 4),
        ] {
            let mut encoded = BytesMut::new();
            VariableByteInteger(value).encode(&mut encoded);

            assert_eq!(encoded.len(), expected_len, "value {}", value);
            assert_eq!(VariableByteInteger(value).encoded_size(), expected_len);

            let decoded = VariableByteInteger::decode(&mut encoded).unwrap();
            assert_eq!(decoded.0, value);
        }
    }

    #[test]
    fn test_decoder_malformed_integer() {
        let mut encoded = Bytes::from(vec![0xc5, 0xc5, 0xc5, 0xc5, 0x02]);

        match VariableByteInteger::decode(&mut encoded) {
            Err(e) => assert_eq!(e, Error::MalformedLength),
            _ => unreachable!(),
        };
    }

    #[test]
    fn test_decoder_incomplete_integer() {
        let mut encoded = Bytes::from(vec![0xc5]);

        match VariableByteInteger::decode(&mut encoded) {
            Err(e) => assert_eq!(e, Error::Incomplete),
            _ => unreachable!(),
        };
    }

    #[test]
    fn test_string_encode_decode() -> crate::Result<()> {
        let value = String::from("test/topic");
        let mut encoded = BytesMut::new();

        value.encode(&mut encoded);
        assert_eq!(&encoded[..2], &[0x00, 0x0a]);
        assert_eq!(value.encoded_size(), 12);

        let decoded = String::decode(&mut encoded)?;
        assert_eq!(decoded, value);

        Ok(())
    }

    #[test]
    fn test_string_length_overruns_buffer() {
        let mut encoded = Bytes::from(vec![0x00, 0x05, b'a', b'b']);

        match String::decode(&mut encoded) {
            Err(e) => assert_eq!(e, Error::MalformedSize),
            _ => unreachable!(),
        };
    }

    #[test]
    fn test_check_string_size() {
        assert_eq!(check_string_size(0), Err(Error::InvalidLength));
        assert_eq!(check_string_size(1), Ok(()));
        assert_eq!(check_string_size(65_535), Ok(()));
        assert_eq!(check_string_size(65_536), Err(Error::InvalidLength));
    }
}
