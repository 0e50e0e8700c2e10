//! Error types for the courier codec.

use core::fmt;

/// Error type for packet encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The buffer does not hold a complete field yet.
    Incomplete,

    /// The variable length field carries more than four bytes.
    MalformedLength,

    /// The remaining length does not match the expected value for the
    /// packet type, or a length field overruns the packet body.
    MalformedSize,

    /// A field violates the packet format in some other way, for example
    /// reserved bits set, an invalid QoS value or non-UTF-8 text.
    MalformedPacket,

    /// A string is empty or longer than 65535 bytes.
    InvalidLength,

    /// A packet of this type is not valid in this direction. The raw type
    /// nibble is attached.
    UnexpectedPacket(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Incomplete => write!(f, "packet is not complete"),
            Error::MalformedLength => write!(f, "malformed variable length field"),
            Error::MalformedSize => write!(f, "remaining length does not match the packet type"),
            Error::MalformedPacket => write!(f, "malformed packet"),
            Error::InvalidLength => write!(f, "string length out of bounds"),
            Error::UnexpectedPacket(t) => write!(f, "unexpected packet of type {}", t),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
