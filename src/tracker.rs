//! Tracker-side announce handling ([BEP-3], [BEP-23]).
//!
//! [`announce`] records the announcing peer in a [`PeerStore`] and answers
//! with the other members of the swarm, either as compact byte blocks or as
//! a list of dictionaries. [`AnnounceResponse`] also parses replies for the
//! client side. Transport (HTTP query parsing, sockets) is left to the caller.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-23]: http://bittorrent.org/beps/bep_0023.html

mod announce;
mod error;
mod response;
mod store;

pub use announce::{announce, AnnounceRequest, TrackerEvent};
pub use error::TrackerError;
pub use response::{failure_body, AnnounceResponse, DictPeer, PeerList};
pub use store::{MemoryPeerStore, PeerStore, TrackedPeer};

#[cfg(test)]
mod tests;
