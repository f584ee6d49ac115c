use super::bitfield::Bitfield;
use super::error::PeerError;
use super::message::{Handshake, Message};
use super::peer_id::PeerId;
use super::piece::{Block, BlockRequest, RequestHandler};
use super::transport::PeerTransport;
use crate::constants::{INACTIVITY_TIMEOUT, MAX_PIECE_INDEX};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace, warn};

/// The lifecycle state of a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Transport attached, handshake not started.
    Connecting,
    /// Exchanging handshakes.
    Handshaking,
    /// Handshake verified; messages flow.
    Active,
    /// Closed locally, by the peer, or for inactivity.
    Closed,
}

/// Which side opened the connection. Decides handshake order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends its handshake first.
    Initiator,
    /// Waits for and verifies the remote handshake before answering.
    Acceptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChokingState {
    pub am_choking: bool,
    pub am_interested: bool,
    pub peer_choking: bool,
    pub peer_interested: bool,
}

impl Default for ChokingState {
    fn default() -> Self {
        Self {
            am_choking: true,
            am_interested: false,
            peer_choking: true,
            peer_interested: false,
        }
    }
}

/// Closes a connection from outside the task driving it.
///
/// Closing wakes a pending [`PeerConnection::handshake`] or
/// [`PeerConnection::receive`], which then fails with
/// [`PeerError::ConnectionClosed`]. A close requested while nothing is
/// pending takes effect on the next call.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    signal: Arc<Notify>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.signal.notify_one();
    }
}

/// A connection to a single BitTorrent peer.
///
/// Bound at construction to the torrent's info hash, our peer id and the
/// peer id we expect from the remote side. The handshake verifies all three
/// before the connection becomes [`PeerState::Active`]; after that every
/// frame read refreshes the liveness timestamp and updates the choke,
/// interest and availability state.
///
/// # Examples
///
/// ```no_run
/// use btwire::peer::{BlockRequest, PeerConnection, PeerId, RequestHandler};
///
/// struct Log;
///
/// impl RequestHandler for Log {
///     fn on_request(&mut self, request: BlockRequest) {
///         println!("peer wants {:?}", request);
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let addr = "192.168.1.100:6881".parse()?;
/// let remote = PeerId::from_bytes(b"-XX0001-123456789012").unwrap();
///
/// let mut conn = PeerConnection::connect(addr, [0u8; 20], PeerId::generate(), remote, 128).await?;
/// conn.run(&mut Log).await?;
/// # Ok(())
/// # }
/// ```
pub struct PeerConnection<S = TcpStream> {
    role: Role,
    state: PeerState,
    info_hash: [u8; 20],
    local_peer_id: PeerId,
    remote_peer_id: PeerId,
    choking: ChokingState,
    peer_bitfield: Bitfield,
    handshake_complete: bool,
    last_received_at: Instant,
    inactivity_timeout: Duration,
    close_signal: Arc<Notify>,
    transport: Option<PeerTransport<S>>,
}

impl PeerConnection<TcpStream> {
    /// Opens a TCP connection and performs the handshake as initiator.
    pub async fn connect(
        addr: SocketAddr,
        info_hash: [u8; 20],
        local_peer_id: PeerId,
        remote_peer_id: PeerId,
        piece_count: usize,
    ) -> Result<Self, PeerError> {
        let stream = timeout(INACTIVITY_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| PeerError::Timeout)??;
        debug!(%addr, "connected, starting handshake");

        let mut conn = Self::new(
            stream,
            Role::Initiator,
            info_hash,
            local_peer_id,
            remote_peer_id,
            piece_count,
        );
        conn.handshake().await?;
        Ok(conn)
    }

    /// Performs the handshake as acceptor on an incoming TCP connection.
    pub async fn accept(
        stream: TcpStream,
        info_hash: [u8; 20],
        local_peer_id: PeerId,
        remote_peer_id: PeerId,
        piece_count: usize,
    ) -> Result<Self, PeerError> {
        let addr = stream.peer_addr()?;
        debug!(%addr, "accepted, waiting for handshake");

        let mut conn = Self::new(
            stream,
            Role::Acceptor,
            info_hash,
            local_peer_id,
            remote_peer_id,
            piece_count,
        );
        conn.handshake().await?;
        Ok(conn)
    }
}

impl<S> PeerConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an established stream. The connection starts in
    /// [`PeerState::Connecting`]; call [`handshake`](Self::handshake) next.
    ///
    /// The peer bitfield starts sized for `piece_count` pieces and grows if
    /// the peer reports more.
    pub fn new(
        stream: S,
        role: Role,
        info_hash: [u8; 20],
        local_peer_id: PeerId,
        remote_peer_id: PeerId,
        piece_count: usize,
    ) -> Self {
        Self {
            role,
            state: PeerState::Connecting,
            info_hash,
            local_peer_id,
            remote_peer_id,
            choking: ChokingState::default(),
            peer_bitfield: Bitfield::for_pieces(piece_count),
            handshake_complete: false,
            last_received_at: Instant::now(),
            inactivity_timeout: INACTIVITY_TIMEOUT,
            close_signal: Arc::new(Notify::new()),
            transport: Some(PeerTransport::new(stream)),
        }
    }

    pub fn with_inactivity_timeout(mut self, inactivity_timeout: Duration) -> Self {
        self.inactivity_timeout = inactivity_timeout;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        if let Some(transport) = self.transport.as_mut() {
            transport.set_write_timeout(write_timeout);
        }
        self
    }

    pub fn with_max_message_size(mut self, max: usize) -> Self {
        if let Some(transport) = self.transport.as_mut() {
            transport.set_max_message_size(max);
        }
        self
    }

    /// Exchanges and verifies handshakes.
    ///
    /// The initiator sends first; the acceptor verifies the remote handshake
    /// before answering. A protocol name, info hash or peer id mismatch
    /// closes the connection, as does a [`CloseHandle`] firing while the
    /// exchange is pending.
    pub async fn handshake(&mut self) -> Result<(), PeerError> {
        self.expect_state(PeerState::Connecting)?;
        self.state = PeerState::Handshaking;

        let deadline = Instant::now() + self.inactivity_timeout;
        let signal = self.close_signal.clone();
        let result = tokio::select! {
            biased;
            _ = signal.notified() => Err(PeerError::ConnectionClosed),
            exchanged = timeout_at(deadline, self.exchange_handshakes()) => {
                exchanged.unwrap_or(Err(PeerError::Timeout))
            }
        };

        match result {
            Ok(()) => {
                self.state = PeerState::Active;
                self.handshake_complete = true;
                self.last_received_at = Instant::now();
                debug!(peer = %self.remote_peer_id, role = ?self.role, "handshake complete");
                Ok(())
            }
            Err(e) => {
                warn!(peer = %self.remote_peer_id, error = %e, "handshake failed");
                self.close();
                Err(e)
            }
        }
    }

    /// Reads one frame and applies it to the connection state.
    ///
    /// Keep-alives only refresh the liveness timestamp. Requests, pieces,
    /// cancels and port messages are returned for the caller to act on. Any
    /// error other than calling in the wrong state closes the connection.
    pub async fn receive(&mut self) -> Result<Message, PeerError> {
        self.expect_state(PeerState::Active)?;

        match self.read_and_apply().await {
            Ok(message) => Ok(message),
            Err(e) => {
                match e {
                    PeerError::Inactive => {
                        warn!(peer = %self.remote_peer_id, "closing inactive connection")
                    }
                    PeerError::ConnectionClosed => {
                        debug!(peer = %self.remote_peer_id, "connection closed")
                    }
                    _ => warn!(peer = %self.remote_peer_id, error = %e, "closing connection"),
                }
                self.close();
                Err(e)
            }
        }
    }

    /// Reads and dispatches messages until the connection ends.
    ///
    /// Returns `Ok(())` when the peer or a [`CloseHandle`] closes the
    /// connection, and the error for inactivity or protocol violations.
    pub async fn run<H: RequestHandler>(&mut self, handler: &mut H) -> Result<(), PeerError> {
        loop {
            match self.receive().await {
                Ok(Message::Request {
                    index,
                    begin,
                    length,
                }) => handler.on_request(BlockRequest::new(index, begin, length)),
                Ok(Message::Piece { index, begin, data }) => {
                    handler.on_piece(Block::new(index, begin, data))
                }
                Ok(Message::Cancel {
                    index,
                    begin,
                    length,
                }) => handler.on_cancel(BlockRequest::new(index, begin, length)),
                Ok(Message::Port(port)) => handler.on_port(port),
                Ok(_) => {}
                Err(PeerError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a message, recording our own choke and interest changes.
    pub async fn send(&mut self, message: Message) -> Result<(), PeerError> {
        self.expect_state(PeerState::Active)?;
        let transport = self
            .transport
            .as_mut()
            .ok_or(PeerError::ConnectionClosed)?;

        if let Err(e) = transport.send_message(&message).await {
            self.close();
            return Err(e);
        }

        match message {
            Message::Choke => self.choking.am_choking = true,
            Message::Unchoke => self.choking.am_choking = false,
            Message::Interested => self.choking.am_interested = true,
            Message::NotInterested => self.choking.am_interested = false,
            _ => {}
        }
        Ok(())
    }

    /// Drops the transport. Idempotent.
    pub fn close(&mut self) {
        self.transport = None;
        self.state = PeerState::Closed;
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            signal: self.close_signal.clone(),
        }
    }

    /// Returns true once nothing has arrived for longer than the
    /// inactivity timeout.
    pub fn is_inactive(&self) -> bool {
        self.last_received_at.elapsed() > self.inactivity_timeout
    }

    /// Closes the connection if it has gone inactive. Returns true if it did.
    pub fn close_if_inactive(&mut self) -> bool {
        if self.state != PeerState::Closed && self.is_inactive() {
            warn!(peer = %self.remote_peer_id, "closing inactive connection");
            self.close();
            return true;
        }
        false
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn choking(&self) -> ChokingState {
        self.choking
    }

    pub fn peer_bitfield(&self) -> &Bitfield {
        &self.peer_bitfield
    }

    pub fn handshake_complete(&self) -> bool {
        self.handshake_complete
    }

    pub fn last_received_at(&self) -> Instant {
        self.last_received_at
    }

    pub fn info_hash(&self) -> &[u8; 20] {
        &self.info_hash
    }

    pub fn remote_peer_id(&self) -> PeerId {
        self.remote_peer_id
    }

    pub fn is_connected(&self) -> bool {
        self.state == PeerState::Active && self.transport.is_some()
    }

    /// True when we want data and the peer lets us ask for it.
    pub fn can_request(&self) -> bool {
        self.is_connected() && !self.choking.peer_choking && self.choking.am_interested
    }

    async fn exchange_handshakes(&mut self) -> Result<(), PeerError> {
        let ours = Handshake::new(self.info_hash, self.local_peer_id);
        let transport = self
            .transport
            .as_mut()
            .ok_or(PeerError::ConnectionClosed)?;

        match self.role {
            Role::Initiator => {
                transport.send_handshake(&ours).await?;
                let theirs = transport.receive_handshake().await?;
                verify_handshake(&theirs, &self.info_hash, &self.remote_peer_id)
            }
            Role::Acceptor => {
                let theirs = transport.receive_handshake().await?;
                verify_handshake(&theirs, &self.info_hash, &self.remote_peer_id)?;
                transport.send_handshake(&ours).await
            }
        }
    }

    async fn read_and_apply(&mut self) -> Result<Message, PeerError> {
        let deadline = self.last_received_at + self.inactivity_timeout;
        let signal = self.close_signal.clone();
        let transport = self
            .transport
            .as_mut()
            .ok_or(PeerError::ConnectionClosed)?;

        let frame = tokio::select! {
            biased;
            _ = signal.notified() => return Err(PeerError::ConnectionClosed),
            read = timeout_at(deadline, transport.receive_frame()) => {
                read.map_err(|_| PeerError::Inactive)??
            }
        };
        self.last_received_at = Instant::now();

        let message = Message::decode_body(frame)?;
        self.apply(&message)?;
        Ok(message)
    }

    fn apply(&mut self, message: &Message) -> Result<(), PeerError> {
        match message {
            Message::KeepAlive => trace!(peer = %self.remote_peer_id, "keep-alive"),
            Message::Choke => self.choking.peer_choking = true,
            Message::Unchoke => self.choking.peer_choking = false,
            Message::Interested => self.choking.peer_interested = true,
            Message::NotInterested => self.choking.peer_interested = false,
            Message::Have { piece } => {
                if *piece > MAX_PIECE_INDEX {
                    return Err(PeerError::InvalidMessage(format!(
                        "have index out of range: {}",
                        piece
                    )));
                }
                self.peer_bitfield.set(*piece as usize);
            }
            Message::Bitfield(bits) => self.peer_bitfield.load_from_bytes(bits),
            Message::Request { .. }
            | Message::Piece { .. }
            | Message::Cancel { .. }
            | Message::Port(_) => {}
        }
        Ok(())
    }

    fn expect_state(&self, expected: PeerState) -> Result<(), PeerError> {
        if self.state != expected {
            return Err(PeerError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}

fn verify_handshake(
    theirs: &Handshake,
    info_hash: &[u8; 20],
    remote_peer_id: &PeerId,
) -> Result<(), PeerError> {
    if &theirs.info_hash != info_hash {
        return Err(PeerError::InfoHashMismatch);
    }
    if &theirs.peer_id != remote_peer_id {
        return Err(PeerError::PeerIdMismatch);
    }
    Ok(())
}
