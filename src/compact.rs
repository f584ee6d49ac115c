//! Compact peer address encoding ([BEP-23], [BEP-7]).
//!
//! Trackers return peers as concatenated fixed-width records instead of
//! nested dictionaries: 4 address bytes + 2 port bytes for IPv4, 16 + 2 for
//! IPv6. The two families always travel in separate blocks (`peers` and
//! `peers6`).
//!
//! Textual addresses are packed with [`pack_ipv4`] and [`pack_ipv6`]; the
//! latter expands `::` zero-compression through [`expand_ipv6`]. All
//! functions here are pure and safe to call from any number of tasks.
//!
//! [BEP-23]: http://bittorrent.org/beps/bep_0023.html
//! [BEP-7]: http://bittorrent.org/beps/bep_0007.html

mod address;
mod error;
mod peer;

pub use address::{expand_ipv6, pack_ip, pack_ipv4, pack_ipv6, pack_port, IpFamily};
pub use error::AddressError;
pub use peer::{parse_compact_peers, parse_compact_peers6, CompactPeer, CompactPeers};
