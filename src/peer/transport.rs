use super::error::PeerError;
use super::message::{Handshake, Message};
use crate::constants::{
    HANDSHAKE_LEN, LENGTH_PREFIX_LEN, MAX_MESSAGE_SIZE, READ_BUFFER_CAPACITY, WRITE_TIMEOUT,
};
use bytes::{Buf, Bytes, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Length-prefixed framing over a byte stream.
///
/// Reads carry no timeout of their own; the owning connection bounds them
/// with its inactivity deadline.
pub struct PeerTransport<S = TcpStream> {
    stream: S,
    read_buf: BytesMut,
    max_message_size: usize,
    write_timeout: Duration,
}

impl<S> PeerTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(READ_BUFFER_CAPACITY),
            max_message_size: MAX_MESSAGE_SIZE,
            write_timeout: WRITE_TIMEOUT,
        }
    }

    pub fn set_max_message_size(&mut self, max: usize) {
        self.max_message_size = max;
    }

    pub fn set_write_timeout(&mut self, write_timeout: Duration) {
        self.write_timeout = write_timeout;
    }

    pub async fn send_handshake(&mut self, handshake: &Handshake) -> Result<(), PeerError> {
        self.write(&handshake.encode()).await
    }

    pub async fn receive_handshake(&mut self) -> Result<Handshake, PeerError> {
        self.fill(HANDSHAKE_LEN).await?;
        let data = self.read_buf.split_to(HANDSHAKE_LEN);
        Handshake::decode(&data)
    }

    pub async fn send_message(&mut self, message: &Message) -> Result<(), PeerError> {
        self.write(&message.encode()).await
    }

    /// Reads one frame and returns its body (id byte and payload).
    ///
    /// A keep-alive yields an empty body.
    pub async fn receive_frame(&mut self) -> Result<Bytes, PeerError> {
        self.fill(LENGTH_PREFIX_LEN).await?;

        let length = u32::from_be_bytes([
            self.read_buf[0],
            self.read_buf[1],
            self.read_buf[2],
            self.read_buf[3],
        ]) as usize;

        if length > self.max_message_size {
            return Err(PeerError::InvalidMessage(format!(
                "message too large: {}",
                length
            )));
        }

        self.fill(LENGTH_PREFIX_LEN + length).await?;
        self.read_buf.advance(LENGTH_PREFIX_LEN);
        Ok(self.read_buf.split_to(length).freeze())
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), PeerError> {
        timeout(self.write_timeout, self.stream.write_all(data))
            .await
            .map_err(|_| PeerError::Timeout)??;
        Ok(())
    }

    async fn fill(&mut self, len: usize) -> Result<(), PeerError> {
        while self.read_buf.len() < len {
            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(PeerError::ConnectionClosed);
            }
        }
        Ok(())
    }
}
