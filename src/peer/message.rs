use super::error::PeerError;
use super::peer_id::PeerId;
use crate::constants::{HANDSHAKE_LEN, LENGTH_PREFIX_LEN, PROTOCOL_NAME, RESERVED_BYTES};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// The id byte that follows the length prefix of every non-empty frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageId {
    /// Sender will not serve requests.
    Choke = 0,
    /// Sender will serve requests.
    Unchoke = 1,
    /// Sender wants pieces the receiver has.
    Interested = 2,
    NotInterested = 3,
    /// One newly available piece index.
    Have = 4,
    /// Full availability map, MSB first.
    Bitfield = 5,
    /// Block request: index, begin, length.
    Request = 6,
    /// Block data: index, begin, payload.
    Piece = 7,
    /// Withdraws an earlier request.
    Cancel = 8,
    /// DHT listen port.
    Port = 9,
}

impl TryFrom<u8> for MessageId {
    type Error = PeerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageId::Choke),
            1 => Ok(MessageId::Unchoke),
            2 => Ok(MessageId::Interested),
            3 => Ok(MessageId::NotInterested),
            4 => Ok(MessageId::Have),
            5 => Ok(MessageId::Bitfield),
            6 => Ok(MessageId::Request),
            7 => Ok(MessageId::Piece),
            8 => Ok(MessageId::Cancel),
            9 => Ok(MessageId::Port),
            _ => Err(PeerError::UnknownMessageId(value)),
        }
    }
}

/// The fixed 68-byte handshake that opens every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub info_hash: [u8; 20],
    pub peer_id: PeerId,
    pub reserved: [u8; 8],
}

impl Handshake {
    pub fn new(info_hash: [u8; 20], peer_id: PeerId) -> Self {
        Self {
            info_hash,
            peer_id,
            reserved: RESERVED_BYTES,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_LEN);
        buf.put_u8(PROTOCOL_NAME.len() as u8);
        buf.put_slice(PROTOCOL_NAME);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.info_hash);
        buf.put_slice(self.peer_id.as_bytes());
        buf.freeze()
    }

    /// Decodes a handshake, rejecting any protocol other than BitTorrent 1.0.
    ///
    /// Reserved bits are accepted as sent; no extension is acted upon.
    pub fn decode(data: &[u8]) -> Result<Self, PeerError> {
        if data.len() < HANDSHAKE_LEN {
            return Err(PeerError::InvalidMessage("handshake too short".into()));
        }

        let name_len = PROTOCOL_NAME.len();
        if data[0] as usize != name_len || &data[1..1 + name_len] != PROTOCOL_NAME {
            return Err(PeerError::ProtocolMismatch);
        }

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&data[20..28]);

        let mut info_hash = [0u8; 20];
        info_hash.copy_from_slice(&data[28..48]);

        let mut peer_id = [0u8; 20];
        peer_id.copy_from_slice(&data[48..68]);

        Ok(Self {
            info_hash,
            peer_id: PeerId(peer_id),
            reserved,
        })
    }
}

/// A decoded peer wire frame.
///
/// Every variant but [`Message::KeepAlive`] maps to one [`MessageId`];
/// integers are big-endian on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Zero-length frame; only refreshes the liveness timestamp.
    KeepAlive,
    Choke,
    Unchoke,
    Interested,
    NotInterested,
    /// The sender now has `piece`.
    Have { piece: u32 },
    /// Raw bitfield bytes. Spare trailing bits are not checked.
    Bitfield(Bytes),
    Request { index: u32, begin: u32, length: u32 },
    /// A block of piece `index` starting at byte offset `begin`.
    Piece { index: u32, begin: u32, data: Bytes },
    Cancel { index: u32, begin: u32, length: u32 },
    /// Port of the sender's DHT node.
    Port(u16),
}

impl Message {
    /// The wire id, or `None` for a keep-alive.
    pub fn id(&self) -> Option<MessageId> {
        match self {
            Message::KeepAlive => None,
            Message::Choke => Some(MessageId::Choke),
            Message::Unchoke => Some(MessageId::Unchoke),
            Message::Interested => Some(MessageId::Interested),
            Message::NotInterested => Some(MessageId::NotInterested),
            Message::Have { .. } => Some(MessageId::Have),
            Message::Bitfield(_) => Some(MessageId::Bitfield),
            Message::Request { .. } => Some(MessageId::Request),
            Message::Piece { .. } => Some(MessageId::Piece),
            Message::Cancel { .. } => Some(MessageId::Cancel),
            Message::Port(_) => Some(MessageId::Port),
        }
    }

    /// Encodes the message with its 4-byte length prefix.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        match self {
            Message::KeepAlive => {
                buf.put_u32(0);
            }
            Message::Choke => {
                buf.put_u32(1);
                buf.put_u8(MessageId::Choke as u8);
            }
            Message::Unchoke => {
                buf.put_u32(1);
                buf.put_u8(MessageId::Unchoke as u8);
            }
            Message::Interested => {
                buf.put_u32(1);
                buf.put_u8(MessageId::Interested as u8);
            }
            Message::NotInterested => {
                buf.put_u32(1);
                buf.put_u8(MessageId::NotInterested as u8);
            }
            Message::Have { piece } => {
                buf.put_u32(5);
                buf.put_u8(MessageId::Have as u8);
                buf.put_u32(*piece);
            }
            Message::Bitfield(bits) => {
                buf.put_u32(1 + bits.len() as u32);
                buf.put_u8(MessageId::Bitfield as u8);
                buf.put_slice(bits);
            }
            Message::Request {
                index,
                begin,
                length,
            } => {
                buf.put_u32(13);
                buf.put_u8(MessageId::Request as u8);
                buf.put_u32(*index);
                buf.put_u32(*begin);
                buf.put_u32(*length);
            }
            Message::Piece { index, begin, data } => {
                buf.put_u32(9 + data.len() as u32);
                buf.put_u8(MessageId::Piece as u8);
                buf.put_u32(*index);
                buf.put_u32(*begin);
                buf.put_slice(data);
            }
            Message::Cancel {
                index,
                begin,
                length,
            } => {
                buf.put_u32(13);
                buf.put_u8(MessageId::Cancel as u8);
                buf.put_u32(*index);
                buf.put_u32(*begin);
                buf.put_u32(*length);
            }
            Message::Port(port) => {
                buf.put_u32(3);
                buf.put_u8(MessageId::Port as u8);
                buf.put_u16(*port);
            }
        }

        buf.freeze()
    }

    /// Decodes one length-prefixed frame.
    pub fn decode(mut data: Bytes) -> Result<Self, PeerError> {
        if data.len() < LENGTH_PREFIX_LEN {
            return Err(PeerError::InvalidMessage("too short".into()));
        }

        let length = data.get_u32() as usize;
        if length == 0 {
            return Ok(Message::KeepAlive);
        }
        if data.remaining() < length {
            return Err(PeerError::InvalidMessage("incomplete message".into()));
        }

        Self::decode_body(data.split_to(length))
    }

    /// Decodes a frame body: the id byte followed by its payload.
    pub fn decode_body(mut data: Bytes) -> Result<Self, PeerError> {
        if data.is_empty() {
            return Ok(Message::KeepAlive);
        }

        let id = MessageId::try_from(data.get_u8())?;
        let too_short = |name: &str| PeerError::InvalidMessage(format!("{} too short", name));

        match id {
            MessageId::Choke => Ok(Message::Choke),
            MessageId::Unchoke => Ok(Message::Unchoke),
            MessageId::Interested => Ok(Message::Interested),
            MessageId::NotInterested => Ok(Message::NotInterested),
            MessageId::Have => {
                if data.remaining() < 4 {
                    return Err(too_short("have"));
                }
                Ok(Message::Have {
                    piece: data.get_u32(),
                })
            }
            MessageId::Bitfield => Ok(Message::Bitfield(data)),
            MessageId::Request => {
                if data.remaining() < 12 {
                    return Err(too_short("request"));
                }
                Ok(Message::Request {
                    index: data.get_u32(),
                    begin: data.get_u32(),
                    length: data.get_u32(),
                })
            }
            MessageId::Piece => {
                if data.remaining() < 8 {
                    return Err(too_short("piece"));
                }
                let index = data.get_u32();
                let begin = data.get_u32();
                Ok(Message::Piece { index, begin, data })
            }
            MessageId::Cancel => {
                if data.remaining() < 12 {
                    return Err(too_short("cancel"));
                }
                Ok(Message::Cancel {
                    index: data.get_u32(),
                    begin: data.get_u32(),
                    length: data.get_u32(),
                })
            }
            MessageId::Port => {
                if data.remaining() < 2 {
                    return Err(too_short("port"));
                }
                Ok(Message::Port(data.get_u16()))
            }
        }
    }
}
