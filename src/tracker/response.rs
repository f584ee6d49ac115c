use super::error::TrackerError;
use crate::bencode::{decode, encode, Value};
use crate::compact::{parse_compact_peers, parse_compact_peers6, CompactPeer, CompactPeers};
use crate::peer::PeerId;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// A peer in the non-compact (dictionary) peer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictPeer {
    pub peer_id: Option<PeerId>,
    pub addr: CompactPeer,
}

/// The two shapes a tracker may return peers in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerList {
    /// BEP-23 byte blocks, IPv4 in `peers` and IPv6 in `peers6`.
    Compact(CompactPeers),
    /// A list of `{ip, port, peer id}` dictionaries.
    Dict(Vec<DictPeer>),
}

impl PeerList {
    pub fn len(&self) -> usize {
        match self {
            PeerList::Compact(packed) => packed.peers().len(),
            PeerList::Dict(peers) => peers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PeerList::Compact(packed) => packed.is_empty(),
            PeerList::Dict(peers) => peers.is_empty(),
        }
    }

    pub fn socket_addrs(&self) -> Vec<SocketAddr> {
        match self {
            PeerList::Compact(packed) => packed.peers(),
            PeerList::Dict(peers) => peers.iter().map(|p| p.addr.to_socket_addr()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub interval: u32,
    pub min_interval: Option<u32>,
    pub complete: Option<u32>,
    pub incomplete: Option<u32>,
    pub warning_message: Option<String>,
    pub peers: PeerList,
}

impl AnnounceResponse {
    pub fn new(interval: u32, peers: PeerList) -> Self {
        Self {
            interval,
            min_interval: None,
            complete: None,
            incomplete: None,
            warning_message: None,
            peers,
        }
    }

    /// Builds the bencoded response dictionary.
    ///
    /// Compact responses always carry a `peers6` block, even when empty.
    pub fn to_value(&self) -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(key("interval"), Value::from(self.interval));

        if let Some(min_interval) = self.min_interval {
            dict.insert(key("min interval"), Value::from(min_interval));
        }
        if let Some(complete) = self.complete {
            dict.insert(key("complete"), Value::from(complete));
        }
        if let Some(incomplete) = self.incomplete {
            dict.insert(key("incomplete"), Value::from(incomplete));
        }
        if let Some(warning) = &self.warning_message {
            dict.insert(key("warning message"), Value::string(warning));
        }

        match &self.peers {
            PeerList::Compact(packed) => {
                dict.insert(key("peers"), Value::Bytes(packed.v4.clone()));
                dict.insert(key("peers6"), Value::Bytes(packed.v6.clone()));
            }
            PeerList::Dict(peers) => {
                let list = peers.iter().map(dict_peer_value).collect::<Vec<_>>();
                dict.insert(key("peers"), Value::List(list));
            }
        }

        Value::Dict(dict)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TrackerError> {
        Ok(encode(&self.to_value())?)
    }

    /// Parses a tracker reply body.
    ///
    /// A `failure reason` becomes [`TrackerError::Failure`]. Dictionary
    /// peers with an unparseable address or port are skipped.
    pub fn from_bencode(data: &[u8]) -> Result<Self, TrackerError> {
        let value = decode(data)?;
        let dict = value
            .as_dict()
            .ok_or_else(|| TrackerError::InvalidResponse("expected dict".into()))?;

        if let Some(failure) = dict.get(b"failure reason".as_slice()) {
            let reason = failure
                .as_bytes()
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            return Err(TrackerError::Failure(reason.into_owned()));
        }

        let interval = dict
            .get(b"interval".as_slice())
            .and_then(|v| v.as_integer())
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| TrackerError::InvalidResponse("missing interval".into()))?;

        let peers = match dict.get(b"peers".as_slice()) {
            None => PeerList::Compact(CompactPeers::default()),
            Some(Value::List(list)) => {
                PeerList::Dict(list.iter().filter_map(parse_dict_peer).collect())
            }
            Some(other) => {
                let v4 = other.as_bytes().ok_or_else(|| {
                    TrackerError::InvalidResponse("peers is not a string or list".into())
                })?;
                let v6 = dict
                    .get(b"peers6".as_slice())
                    .and_then(|v| v.as_bytes())
                    .unwrap_or_default();
                PeerList::Compact(repack(v4, v6))
            }
        };

        let optional_u32 = |name: &[u8]| {
            dict.get(name)
                .and_then(|v| v.as_integer())
                .and_then(|v| u32::try_from(v).ok())
        };

        Ok(Self {
            interval,
            min_interval: optional_u32(b"min interval"),
            complete: optional_u32(b"complete"),
            incomplete: optional_u32(b"incomplete"),
            warning_message: dict
                .get(b"warning message".as_slice())
                .and_then(|v| v.as_str())
                .map(String::from),
            peers,
        })
    }
}

/// Encodes the body a tracker sends when it rejects an announce.
///
/// ```
/// use btwire::tracker::{failure_body, AnnounceResponse, TrackerError};
///
/// let body = failure_body("unregistered torrent").unwrap();
/// assert_eq!(body, b"d14:failure reason20:unregistered torrente");
/// assert!(matches!(AnnounceResponse::from_bencode(&body), Err(TrackerError::Failure(_))));
/// ```
pub fn failure_body(reason: &str) -> Result<Vec<u8>, TrackerError> {
    let mut dict = BTreeMap::new();
    dict.insert(key("failure reason"), Value::string(reason));
    Ok(encode(&Value::Dict(dict))?)
}

fn key(name: &'static str) -> Bytes {
    Bytes::from_static(name.as_bytes())
}

fn dict_peer_value(peer: &DictPeer) -> Value {
    let mut dict = BTreeMap::new();
    dict.insert(key("ip"), Value::from(peer.addr.ip.to_string()));
    dict.insert(key("port"), Value::from(u32::from(peer.addr.port)));
    if let Some(peer_id) = &peer.peer_id {
        dict.insert(key("peer id"), Value::bytes(peer_id.as_bytes()));
    }
    Value::Dict(dict)
}

fn parse_dict_peer(value: &Value) -> Option<DictPeer> {
    let ip = value.get(b"ip")?.as_str()?.parse().ok()?;
    let port = value
        .get(b"port")?
        .as_integer()
        .and_then(|p| u16::try_from(p).ok())?;
    let peer_id = value
        .get(b"peer id")
        .and_then(|v| v.as_bytes())
        .and_then(PeerId::from_bytes);

    Some(DictPeer {
        peer_id,
        addr: CompactPeer::new(ip, port),
    })
}

/// Drops trailing partial records so the blocks stay well formed.
fn repack(v4: &[u8], v6: &[u8]) -> CompactPeers {
    let peers = parse_compact_peers(v4)
        .into_iter()
        .chain(parse_compact_peers6(v6))
        .map(CompactPeer::from)
        .collect::<Vec<_>>();
    CompactPeers::pack(peers.iter())
}
