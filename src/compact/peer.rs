use super::address::{pack_ipv4, pack_ipv6, pack_port, IpFamily};
use super::error::AddressError;
use crate::constants::{COMPACT_V4_LEN, COMPACT_V6_LEN};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// A peer address in compact form: 4 or 16 address bytes followed by a
/// 2-byte big-endian port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactPeer {
    pub ip: IpAddr,
    pub port: u16,
}

impl CompactPeer {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Parses a textual address using the compact packing rules.
    pub fn parse(ip: &str, port: u16) -> Result<Self, AddressError> {
        let ip = match IpFamily::detect(ip) {
            IpFamily::V4 => IpAddr::V4(Ipv4Addr::from(pack_ipv4(ip)?)),
            IpFamily::V6 => IpAddr::V6(Ipv6Addr::from(pack_ipv6(ip)?)),
        };
        Ok(Self { ip, port })
    }

    pub fn family(&self) -> IpFamily {
        match self.ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// Writes the 6- or 18-byte record for this peer.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self.ip {
            IpAddr::V4(ip) => buf.put_slice(&ip.octets()),
            IpAddr::V6(ip) => buf.put_slice(&ip.octets()),
        }
        buf.put_slice(&pack_port(self.port));
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(COMPACT_V6_LEN);
        self.write_to(&mut buf);
        buf.freeze()
    }

    pub fn from_v4_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMPACT_V4_LEN {
            return None;
        }
        let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        let port = u16::from_be_bytes([bytes[4], bytes[5]]);
        Some(Self {
            ip: IpAddr::V4(ip),
            port,
        })
    }

    pub fn from_v6_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMPACT_V6_LEN {
            return None;
        }
        let mut ip_bytes = [0u8; 16];
        ip_bytes.copy_from_slice(&bytes[..16]);
        let ip = Ipv6Addr::from(ip_bytes);
        let port = u16::from_be_bytes([bytes[16], bytes[17]]);
        Some(Self {
            ip: IpAddr::V6(ip),
            port,
        })
    }

    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl From<SocketAddr> for CompactPeer {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

/// Compact peer lists, with IPv4 and IPv6 peers kept in separate blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactPeers {
    /// Concatenated 6-byte IPv4 records.
    pub v4: Bytes,
    /// Concatenated 18-byte IPv6 records.
    pub v6: Bytes,
}

impl CompactPeers {
    /// Packs peers into the two family blocks, preserving their relative order.
    ///
    /// ```
    /// use btwire::compact::{CompactPeer, CompactPeers};
    ///
    /// let peers = [
    ///     CompactPeer::parse("10.0.0.1", 6881).unwrap(),
    ///     CompactPeer::parse("::1", 6881).unwrap(),
    /// ];
    /// let packed = CompactPeers::pack(peers.iter());
    /// assert_eq!(packed.v4.len(), 6);
    /// assert_eq!(packed.v6.len(), 18);
    /// ```
    pub fn pack<'a, I>(peers: I) -> Self
    where
        I: IntoIterator<Item = &'a CompactPeer>,
    {
        let mut v4 = BytesMut::new();
        let mut v6 = BytesMut::new();

        for peer in peers {
            match peer.family() {
                IpFamily::V4 => peer.write_to(&mut v4),
                IpFamily::V6 => peer.write_to(&mut v6),
            }
        }

        Self {
            v4: v4.freeze(),
            v6: v6.freeze(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    /// Unpacks both blocks, IPv4 peers first.
    pub fn peers(&self) -> Vec<SocketAddr> {
        let mut peers = parse_compact_peers(&self.v4);
        peers.extend(parse_compact_peers6(&self.v6));
        peers
    }
}

/// Parses a block of 6-byte IPv4 records. A trailing partial record is ignored.
pub fn parse_compact_peers(data: &[u8]) -> Vec<SocketAddr> {
    data.chunks_exact(COMPACT_V4_LEN)
        .filter_map(CompactPeer::from_v4_bytes)
        .map(|p| p.to_socket_addr())
        .collect()
}

/// Parses a block of 18-byte IPv6 records. A trailing partial record is ignored.
pub fn parse_compact_peers6(data: &[u8]) -> Vec<SocketAddr> {
    data.chunks_exact(COMPACT_V6_LEN)
        .filter_map(CompactPeer::from_v6_bytes)
        .map(|p| p.to_socket_addr())
        .collect()
}
