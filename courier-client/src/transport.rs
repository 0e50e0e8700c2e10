use bytes::BytesMut;
use courier_core::codec::Encoder;
use courier_packets::Packet;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default upper bound on inbound topic length, in bytes.
pub const DEFAULT_MAX_TOPIC_LEN: usize = 128;

/// A byte-stream transport with packet framing. The streams are opaque:
/// TCP sockets, TLS sessions, serial adapters and in-memory test fixtures
/// all fit.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
    read_buffer: BytesMut,
    max_topic_len: usize,
}

impl<S> Transport<ReadHalf<S>, WriteHalf<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a transport from a bidirectional stream.
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self::from_pair(reader, writer)
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport from separate inbound and outbound streams.
    pub fn from_pair(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            read_buffer: BytesMut::with_capacity(4096),
            max_topic_len: DEFAULT_MAX_TOPIC_LEN,
        }
    }

    /// Bound on the length of inbound topics; longer topics make the
    /// packet fail decoding with `MalformedSize`.
    pub fn max_topic_len(mut self, max_topic_len: usize) -> Self {
        self.max_topic_len = max_topic_len;
        self
    }

    /// Write a control packet to the transport.
    pub(crate) async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        debug!(packet = %packet.packet_type(), "writing packet to the server");

        let mut buffer = BytesMut::new();
        packet.encode(&mut buffer);

        self.writer.write_all(&buffer).await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Read one control packet from the transport. Returns `None` when
    /// the stream closes cleanly between packets. A frame that decodes
    /// badly is consumed before the error is returned, so the stream
    /// stays synchronized.
    pub(crate) async fn read_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            if let Some(frame_len) = Packet::check(&self.read_buffer)? {
                if self.read_buffer.len() >= frame_len {
                    let mut frame = self.read_buffer.split_to(frame_len);
                    let packet = Packet::parse(&mut frame, self.max_topic_len)?;

                    debug!(packet = %packet.packet_type(), "read packet from the server");
                    return Ok(Some(packet));
                }
            }

            let mut temp_buf = [0u8; 4096];
            let n = self.reader.read(&mut temp_buf).await?;
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ClientError::TransportClosed);
            }
            self.read_buffer.extend_from_slice(&temp_buf[..n]);
        }
    }
}
