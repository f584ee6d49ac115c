//! btwire - BitTorrent wire formats and peer connections
//!
//! The low-level pieces a BitTorrent client or tracker is built from,
//! following the BEP (BitTorrent Enhancement Proposals) specifications.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding with arbitrary-precision integers
//! - [`compact`] - BEP-23/7 Compact IPv4/IPv6 peer addresses
//! - [`peer`] - BEP-3 Peer wire protocol, handshake and connection state
//! - [`tracker`] - BEP-3/23 Announce handling and tracker responses
//! - [`metainfo`] - BEP-3 Torrent metainfo and info hashes
//! - [`constants`] - Protocol constants and tuning defaults

pub mod bencode;
pub mod compact;
pub mod constants;
pub mod metainfo;
pub mod peer;
pub mod tracker;

pub use bencode::{decode, decode_text, encode, BencodeError, Value};
pub use compact::{AddressError, CompactPeer, CompactPeers};
pub use metainfo::{Metainfo, MetainfoError};
pub use peer::{
    Bitfield, Handshake, Message, PeerConnection, PeerError, PeerId, PeerState, RequestHandler,
    Role,
};
pub use tracker::{announce, AnnounceRequest, AnnounceResponse, MemoryPeerStore, TrackerError};
