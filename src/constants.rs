//! Protocol constants and tuning parameters.
//!
//! Wire-format values fixed by BEP-3 live next to the defaults a connection
//! or tracker starts with. Per-connection overrides are set through the
//! `with_*` builders on [`PeerConnection`](crate::peer::PeerConnection).

use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// Client ID prefix for peer ID generation (Azureus-style)
pub const CLIENT_PREFIX: &[u8; 8] = b"-BW0001-";

// ============================================================================
// Peer wire protocol
// ============================================================================

/// Protocol name sent in the handshake
pub const PROTOCOL_NAME: &[u8; 19] = b"BitTorrent protocol";

/// 1 (name length) + 19 (name) + 8 (reserved) + 20 (info hash) + 20 (peer id)
pub const HANDSHAKE_LEN: usize = 68;

/// Reserved handshake bytes; no extensions are advertised
pub const RESERVED_BYTES: [u8; 8] = [0; 8];

/// Size of the big-endian length prefix on every message
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Largest frame accepted from a peer (length prefix excluded)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Highest piece index accepted in a HAVE message. A bitfield message can
/// never describe more pieces than fit in one frame, so HAVE is held to the
/// same bound.
pub const MAX_PIECE_INDEX: u32 = (MAX_MESSAGE_SIZE * 8) as u32;

/// Close the connection if nothing arrives for this long
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(120);

/// Give up on a single write after this long
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Initial capacity of a connection's read buffer
pub const READ_BUFFER_CAPACITY: usize = 32 * 1024;

// ============================================================================
// Bitfield
// ============================================================================

/// Minimum number of bytes a bitfield grows by, to amortize repeated grows
pub const BITFIELD_GROW_STEP: usize = 512;

// ============================================================================
// Bencode
// ============================================================================

/// Maximum nesting depth accepted by the decoder
pub const MAX_BENCODE_DEPTH: usize = 64;

// ============================================================================
// Tracker
// ============================================================================

/// Announce interval handed to peers, in seconds
pub const ANNOUNCE_INTERVAL: u32 = 5 * 60;

/// Size of a compact IPv4 peer record (address + port)
pub const COMPACT_V4_LEN: usize = 6;

/// Size of a compact IPv6 peer record (address + port)
pub const COMPACT_V6_LEN: usize = 18;
