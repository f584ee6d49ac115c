use super::*;
use crate::bencode::{decode, Value};
use crate::compact::CompactPeer;
use crate::peer::PeerId;
use std::net::{IpAddr, SocketAddr};

const FOO: [u8; 20] = [1u8; 20];
const BAR: [u8; 20] = [2u8; 20];
const PEER_A: PeerId = PeerId(*b"-AA0001-aaaaaaaaaaaa");
const PEER_B: PeerId = PeerId(*b"-BB0001-bbbbbbbbbbbb");
const PEER_C: PeerId = PeerId(*b"-CC0001-cccccccccccc");

fn tracked(id: PeerId, ip: &str, port: u16) -> TrackedPeer {
    TrackedPeer::new(id, CompactPeer::parse(ip, port).unwrap())
}

fn request(id: PeerId, ip: &str, port: u16) -> AnnounceRequest {
    AnnounceRequest::new(FOO, id, ip.parse::<IpAddr>().unwrap(), port)
}

#[test]
fn test_tracker_event() {
    assert_eq!(TrackerEvent::Started.as_str(), "started");
    assert_eq!(TrackerEvent::Stopped.as_str(), "stopped");
    assert_eq!(TrackerEvent::Completed.as_str(), "completed");
    assert_eq!(TrackerEvent::None.as_str(), "");

    assert_eq!(TrackerEvent::parse("completed"), Some(TrackerEvent::Completed));
    assert_eq!(TrackerEvent::parse(""), Some(TrackerEvent::None));
    assert_eq!(TrackerEvent::parse("paused"), None);
}

#[test]
fn test_store_add_is_idempotent() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&BAR, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&FOO, tracked(PEER_B, "127.0.0.2", 65533));

    assert_eq!(
        store.peers(&FOO, None),
        vec![
            tracked(PEER_A, "127.0.0.1", 65534),
            tracked(PEER_B, "127.0.0.2", 65533)
        ]
    );
    assert_eq!(store.peer_count(), 2);
    assert_eq!(store.swarm_count(), 2);
}

#[test]
fn test_store_remove_keeps_other_swarms() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&BAR, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&FOO, tracked(PEER_B, "127.0.0.2", 65533));

    store.remove(&FOO, &PEER_A);
    assert_eq!(store.peers(&FOO, None), vec![tracked(PEER_B, "127.0.0.2", 65533)]);
    assert_eq!(store.peers(&BAR, None), vec![tracked(PEER_A, "127.0.0.1", 65534)]);

    store.remove(&BAR, &PEER_A);
    assert!(store.peers(&BAR, None).is_empty());
    assert_eq!(store.peer_count(), 1);
    assert_eq!(store.swarm_count(), 1);

    // unknown peer and unknown swarm are ignored
    store.remove(&FOO, &PEER_C);
    store.remove(&[9u8; 20], &PEER_B);
    assert_eq!(store.peer_count(), 1);
}

#[test]
fn test_store_update_moves_address() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&BAR, tracked(PEER_A, "127.0.0.1", 65534));
    store.add_or_update(&BAR, tracked(PEER_A, "127.0.0.1", 1111));

    assert_eq!(store.peers(&BAR, None), vec![tracked(PEER_A, "127.0.0.1", 1111)]);
}

#[test]
fn test_store_excludes_peer() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 1));
    store.add_or_update(&FOO, tracked(PEER_B, "127.0.0.2", 2));

    let peers = store.peers(&FOO, Some(&PEER_A));
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].peer_id, PEER_B);
    assert!(store.peers(&BAR, None).is_empty());
}

#[test]
fn test_announce_dict_format() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));

    let response = announce(&request(PEER_B, "10.0.0.2", 1), &store);
    assert_eq!(response.interval, 300);

    let PeerList::Dict(peers) = &response.peers else {
        panic!("expected dict peers");
    };
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].peer_id, Some(PEER_A));
    assert_eq!(peers[0].addr, CompactPeer::parse("127.0.0.1", 65534).unwrap());

    let body = decode(&response.encode().unwrap()).unwrap();
    let list = body.get(b"peers").and_then(Value::as_list).unwrap();
    assert_eq!(list[0].get(b"ip").and_then(Value::as_str), Some("127.0.0.1"));
    assert_eq!(list[0].get(b"port").and_then(Value::as_integer), Some(65534));
    assert_eq!(
        list[0].get(b"peer id").and_then(Value::as_bytes),
        Some(PEER_A.as_bytes().as_slice())
    );
    assert!(body.get(b"peers6").is_none());
}

#[test]
fn test_announce_no_peer_id() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));

    let response = announce(&request(PEER_B, "10.0.0.2", 1).with_no_peer_id(true), &store);
    let body = decode(&response.encode().unwrap()).unwrap();
    let list = body.get(b"peers").and_then(Value::as_list).unwrap();
    assert!(list[0].get(b"peer id").is_none());
}

#[test]
fn test_announce_stopped_removes_peer() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));

    let response = announce(
        &request(PEER_A, "127.0.0.1", 1).with_event(TrackerEvent::Stopped),
        &store,
    );
    assert!(response.peers.is_empty());

    let response = announce(&request(PEER_B, "10.0.0.2", 1), &store);
    assert!(response.peers.is_empty());
    assert_eq!(store.peers(&FOO, None).len(), 1);
}

#[test]
fn test_announce_compact_format() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "127.0.0.1", 65534));

    let response = announce(&request(PEER_B, "10.0.0.2", 1).with_compact(true), &store);
    let body = decode(&response.encode().unwrap()).unwrap();

    assert_eq!(
        body.get(b"peers").and_then(Value::as_bytes),
        Some([127, 0, 0, 1, 255, 254].as_slice())
    );
    assert_eq!(body.get(b"peers6").and_then(Value::as_bytes), Some([].as_slice()));
    assert_eq!(store.peers(&FOO, Some(&PEER_B))[0].addr.port, 65534);
}

#[test]
fn test_announce_compact_ipv6() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "2001:db8::1", 6881));
    store.add_or_update(&FOO, tracked(PEER_C, "192.168.1.1", 6881));

    let response = announce(&request(PEER_B, "10.0.0.2", 1).with_compact(true), &store);
    let PeerList::Compact(packed) = &response.peers else {
        panic!("expected compact peers");
    };
    assert_eq!(packed.v4.len(), 6);
    assert_eq!(packed.v6.len(), 18);
    assert_eq!(&packed.v6[..2], &[0x20, 0x01]);
    assert_eq!(&packed.v6[16..], &[0x1a, 0xe1]);
}

#[test]
fn test_announce_numwant() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "10.0.0.1", 1));
    store.add_or_update(&FOO, tracked(PEER_C, "10.0.0.3", 3));

    let response = announce(&request(PEER_B, "10.0.0.2", 2).with_numwant(1), &store);
    assert_eq!(response.peers.len(), 1);

    let response = announce(&request(PEER_B, "10.0.0.2", 2).with_numwant(0), &store);
    assert_eq!(response.peers.len(), 2);
}

#[test]
fn test_response_from_bencode_compact() {
    let data = b"d8:intervali1800e5:peers12:\xc0\xa8\x01\x01\x1a\xe1\x0a\x00\x00\x01\x1a\xe1e";
    let response = AnnounceResponse::from_bencode(data).unwrap();

    assert_eq!(response.interval, 1800);
    assert_eq!(
        response.peers.socket_addrs(),
        vec![
            "192.168.1.1:6881".parse::<SocketAddr>().unwrap(),
            "10.0.0.1:6881".parse::<SocketAddr>().unwrap()
        ]
    );
}

#[test]
fn test_response_from_bencode_dict() {
    let data = b"d8:completei10e10:incompletei5e8:intervali900e5:peersld2:ip8:10.0.0.14:porti6881eed2:ip3:bad4:porti1eeee";
    let response = AnnounceResponse::from_bencode(data).unwrap();

    assert_eq!(response.interval, 900);
    assert_eq!(response.complete, Some(10));
    assert_eq!(response.incomplete, Some(5));
    assert_eq!(
        response.peers.socket_addrs(),
        vec!["10.0.0.1:6881".parse::<SocketAddr>().unwrap()]
    );
}

#[test]
fn test_response_round_trip() {
    let store = MemoryPeerStore::new();
    store.add_or_update(&FOO, tracked(PEER_A, "10.0.0.1", 6881));
    store.add_or_update(&FOO, tracked(PEER_C, "::1", 6882));

    for compact in [true, false] {
        let response = announce(&request(PEER_B, "10.0.0.2", 1).with_compact(compact), &store);
        let parsed = AnnounceResponse::from_bencode(&response.encode().unwrap()).unwrap();
        assert_eq!(parsed, response);
    }
}

#[test]
fn test_response_failure() {
    let body = failure_body("missing info_hash").unwrap();
    match AnnounceResponse::from_bencode(&body) {
        Err(TrackerError::Failure(reason)) => assert_eq!(reason, "missing info_hash"),
        other => panic!("expected failure, got {:?}", other),
    }

    assert!(matches!(
        AnnounceResponse::from_bencode(b"d5:peers0:e"),
        Err(TrackerError::InvalidResponse(_))
    ));
    assert!(matches!(
        AnnounceResponse::from_bencode(b"le"),
        Err(TrackerError::InvalidResponse(_))
    ));
}
