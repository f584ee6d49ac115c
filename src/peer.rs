//! Peer wire protocol ([BEP-3]).
//!
//! A [`PeerConnection`] walks through `Connecting → Handshaking → Active →
//! Closed`. The handshake binds the connection to one torrent and one
//! remote peer id; afterwards the connection reads length-prefixed frames,
//! tracks choke and interest flags, and mirrors the pieces the remote peer
//! announces in a growable [`Bitfield`].
//!
//! Each connection is a sequential state machine owned by one task; nothing
//! here is shared between connections.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod bitfield;
mod connection;
mod error;
mod message;
mod peer_id;
mod piece;
mod transport;

pub use bitfield::Bitfield;
pub use connection::{ChokingState, CloseHandle, PeerConnection, PeerState, Role};
pub use error::PeerError;
pub use message::{Handshake, Message, MessageId};
pub use peer_id::PeerId;
pub use piece::{Block, BlockRequest, RequestHandler};
pub use transport::PeerTransport;
