use bytes::Bytes;

/// A block requested by the remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockRequest {
    pub piece: u32,
    pub offset: u32,
    pub length: u32,
}

impl BlockRequest {
    pub fn new(piece: u32, offset: u32, length: u32) -> Self {
        Self {
            piece,
            offset,
            length,
        }
    }
}

/// A block of piece data delivered by the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub piece: u32,
    pub offset: u32,
    pub data: Bytes,
}

impl Block {
    pub fn new(piece: u32, offset: u32, data: Bytes) -> Self {
        Self {
            piece,
            offset,
            data,
        }
    }

    pub fn request(&self) -> BlockRequest {
        BlockRequest {
            piece: self.piece,
            offset: self.offset,
            length: self.data.len() as u32,
        }
    }
}

/// Receives the data-plane messages a connection does not act on itself.
///
/// [`PeerConnection::run`](super::PeerConnection::run) tracks choke,
/// interest and availability internally and forwards everything else here.
/// Serving, scheduling and storing pieces is up to the implementor.
pub trait RequestHandler {
    fn on_request(&mut self, request: BlockRequest);

    fn on_piece(&mut self, _block: Block) {}

    fn on_cancel(&mut self, _request: BlockRequest) {}

    fn on_port(&mut self, _port: u16) {}
}
