use super::response::{AnnounceResponse, DictPeer, PeerList};
use super::store::{PeerStore, TrackedPeer};
use crate::compact::{CompactPeer, CompactPeers};
use crate::constants::ANNOUNCE_INTERVAL;
use crate::peer::PeerId;
use std::net::IpAddr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerEvent {
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl TrackerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerEvent::None => "",
            TrackerEvent::Started => "started",
            TrackerEvent::Stopped => "stopped",
            TrackerEvent::Completed => "completed",
        }
    }

    /// Parses the `event` query value. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(TrackerEvent::None),
            "started" => Some(TrackerEvent::Started),
            "stopped" => Some(TrackerEvent::Stopped),
            "completed" => Some(TrackerEvent::Completed),
            _ => None,
        }
    }
}

/// An announce as received by a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub info_hash: [u8; 20],
    pub peer_id: PeerId,
    pub ip: IpAddr,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: TrackerEvent,
    pub compact: bool,
    pub no_peer_id: bool,
    pub numwant: Option<usize>,
}

impl AnnounceRequest {
    pub fn new(info_hash: [u8; 20], peer_id: PeerId, ip: IpAddr, port: u16) -> Self {
        Self {
            info_hash,
            peer_id,
            ip,
            port,
            uploaded: 0,
            downloaded: 0,
            left: 0,
            event: TrackerEvent::None,
            compact: false,
            no_peer_id: false,
            numwant: None,
        }
    }

    pub fn with_event(mut self, event: TrackerEvent) -> Self {
        self.event = event;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_no_peer_id(mut self, no_peer_id: bool) -> Self {
        self.no_peer_id = no_peer_id;
        self
    }

    pub fn with_numwant(mut self, numwant: usize) -> Self {
        self.numwant = Some(numwant);
        self
    }
}

/// Records the announcing peer and answers with the rest of the swarm.
///
/// A `stopped` event removes the peer instead of recording it. The reply
/// never lists the announcing peer itself. A `numwant` of zero means no
/// limit.
pub fn announce<S: PeerStore + ?Sized>(request: &AnnounceRequest, store: &S) -> AnnounceResponse {
    let addr = CompactPeer::new(request.ip, request.port);
    if request.event == TrackerEvent::Stopped {
        store.remove(&request.info_hash, &request.peer_id);
    } else {
        store.add_or_update(&request.info_hash, TrackedPeer::new(request.peer_id, addr));
    }

    let mut swarm = store.peers(&request.info_hash, Some(&request.peer_id));
    if let Some(numwant) = request.numwant.filter(|&n| n > 0) {
        swarm.truncate(numwant);
    }

    debug!(
        peer = %request.peer_id,
        event = request.event.as_str(),
        returned = swarm.len(),
        compact = request.compact,
        "announce"
    );

    let peers = if request.compact {
        PeerList::Compact(CompactPeers::pack(swarm.iter().map(|p| &p.addr)))
    } else {
        PeerList::Dict(
            swarm
                .iter()
                .map(|p| DictPeer {
                    peer_id: (!request.no_peer_id).then_some(p.peer_id),
                    addr: p.addr,
                })
                .collect(),
        )
    };

    AnnounceResponse::new(ANNOUNCE_INTERVAL, peers)
}
