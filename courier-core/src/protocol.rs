//! Protocol-level constants.

/// Protocol name carried in the CONNECT variable header.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level for MQTT 3.1.1.
pub const PROTOCOL_LEVEL: u8 = 0x04;

/// Keep-alive interval advertised at connect, in seconds. The client does
/// not schedule pings itself; the application calls `ping` within this
/// interval to keep the session alive.
pub const KEEP_ALIVE_SECS: u16 = 300;
