use crate::compact::CompactPeer;
use crate::peer::PeerId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// A peer as the tracker remembers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPeer {
    pub peer_id: PeerId,
    pub addr: CompactPeer,
}

impl TrackedPeer {
    pub fn new(peer_id: PeerId, addr: CompactPeer) -> Self {
        Self { peer_id, addr }
    }
}

/// Swarm membership backing the announce handler.
pub trait PeerStore: Send + Sync {
    /// Adds the peer to the torrent's swarm, or refreshes its address.
    fn add_or_update(&self, info_hash: &[u8; 20], peer: TrackedPeer);

    /// Removes the peer from the torrent's swarm. Unknown peers are ignored.
    fn remove(&self, info_hash: &[u8; 20], peer_id: &PeerId);

    /// Lists the swarm in join order, leaving out `exclude`.
    fn peers(&self, info_hash: &[u8; 20], exclude: Option<&PeerId>) -> Vec<TrackedPeer>;
}

#[derive(Debug)]
struct Entry {
    addr: CompactPeer,
    swarms: usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    peers: HashMap<PeerId, Entry>,
    swarms: HashMap<[u8; 20], Vec<PeerId>>,
}

/// In-memory [`PeerStore`].
///
/// A peer's address is shared across every torrent it announces; the entry
/// lives until it has left all of them.
#[derive(Debug, Default)]
pub struct MemoryPeerStore {
    inner: RwLock<StoreInner>,
}

impl MemoryPeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct peers across all torrents.
    pub fn peer_count(&self) -> usize {
        self.inner.read().peers.len()
    }

    /// Number of torrents with at least one peer.
    pub fn swarm_count(&self) -> usize {
        self.inner.read().swarms.len()
    }
}

impl PeerStore for MemoryPeerStore {
    fn add_or_update(&self, info_hash: &[u8; 20], peer: TrackedPeer) {
        let mut inner = self.inner.write();
        let StoreInner { peers, swarms } = &mut *inner;

        let entry = peers.entry(peer.peer_id).or_insert(Entry {
            addr: peer.addr,
            swarms: 0,
        });
        entry.addr = peer.addr;

        let swarm = swarms.entry(*info_hash).or_default();
        if !swarm.contains(&peer.peer_id) {
            swarm.push(peer.peer_id);
            entry.swarms += 1;
            trace!(peer = %peer.peer_id, swarms = entry.swarms, "peer joined swarm");
        }
    }

    fn remove(&self, info_hash: &[u8; 20], peer_id: &PeerId) {
        let mut inner = self.inner.write();
        let StoreInner { peers, swarms } = &mut *inner;

        let Some(swarm) = swarms.get_mut(info_hash) else {
            return;
        };
        let Some(pos) = swarm.iter().position(|id| id == peer_id) else {
            return;
        };

        swarm.remove(pos);
        if swarm.is_empty() {
            swarms.remove(info_hash);
        }

        if let Some(entry) = peers.get_mut(peer_id) {
            entry.swarms -= 1;
            if entry.swarms == 0 {
                peers.remove(peer_id);
            }
        }
        trace!(peer = %peer_id, "peer left swarm");
    }

    fn peers(&self, info_hash: &[u8; 20], exclude: Option<&PeerId>) -> Vec<TrackedPeer> {
        let inner = self.inner.read();
        let Some(swarm) = inner.swarms.get(info_hash) else {
            return Vec::new();
        };

        swarm
            .iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| {
                inner
                    .peers
                    .get(id)
                    .map(|entry| TrackedPeer::new(*id, entry.addr))
            })
            .collect()
    }
}
