use super::connection::PeerState;
use thiserror::Error;

/// Errors that can occur during peer communication.
#[derive(Debug, Error)]
pub enum PeerError {
    /// Network I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer does not speak BitTorrent 1.0.
    #[error("protocol name mismatch")]
    ProtocolMismatch,

    /// The peer's info hash doesn't match ours.
    #[error("info hash mismatch")]
    InfoHashMismatch,

    /// The peer presented a different peer id than the one we expected.
    #[error("peer id mismatch")]
    PeerIdMismatch,

    /// Received a malformed protocol message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Received a message id outside the base protocol.
    #[error("unknown message id: {0}")]
    UnknownMessageId(u8),

    /// The operation is not allowed in the connection's current state.
    #[error("expected connection state {expected:?}, found {actual:?}")]
    InvalidState {
        expected: PeerState,
        actual: PeerState,
    },

    /// The connection was closed by the peer or locally.
    #[error("connection closed")]
    ConnectionClosed,

    /// A write did not complete in time.
    #[error("timeout")]
    Timeout,

    /// Nothing was received within the inactivity window.
    #[error("peer inactive")]
    Inactive,
}

impl PeerError {
    /// Returns true for violations of the wire protocol, as opposed to
    /// transport failures.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            PeerError::ProtocolMismatch
                | PeerError::InfoHashMismatch
                | PeerError::PeerIdMismatch
                | PeerError::InvalidMessage(_)
                | PeerError::UnknownMessageId(_)
                | PeerError::InvalidState { .. }
        )
    }
}
