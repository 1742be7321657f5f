//! UDP client for the relay.
//!
//! Mirrors what the game client does on the wire: one CONNECT_REQUEST,
//! wait for the assigned id, then fire-and-forget piece actions and board
//! snapshots. Used by the integration tests and handy for poking a running
//! server by hand.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Duration, Instant};

use crate::game::Board;
use crate::protocol::{MoveData, Packet, PacketKind, PlayerId, ProtocolError, PACKET_SIZE};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed packet from server: {0}")]
    Protocol(#[from] ProtocolError),
    /// No CONNECT_RESPONSE in time. The room may be full; the server does
    /// not say.
    #[error("no connect response within {0:?}")]
    Timeout(Duration),
    #[error("client is not connected")]
    NotConnected,
    #[error("{0} is not a piece action")]
    NotPieceAction(PacketKind),
}

pub struct RelayClient {
    socket: UdpSocket,
    server: Option<SocketAddr>,
    player_id: Option<PlayerId>,
}

impl RelayClient {
    /// Bind a local endpoint. Use port 0 for an ephemeral port.
    pub async fn bind(local: SocketAddr) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind(local).await?;
        Ok(Self {
            socket,
            server: None,
            player_id: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    /// Send CONNECT_REQUEST and wait for the assigned id. Anything other
    /// than a CONNECT_RESPONSE received while waiting is discarded.
    pub async fn connect(
        &mut self,
        server: SocketAddr,
        wait: Duration,
    ) -> Result<PlayerId, ClientError> {
        self.socket.connect(server).await?;
        self.server = Some(server);
        self.socket.send(&Packet::connect_request().encode()).await?;

        let deadline = Instant::now() + wait;
        let mut buf = vec![0u8; PACKET_SIZE];
        loop {
            let len = match timeout_at(deadline, self.socket.recv(&mut buf)).await {
                Ok(received) => received?,
                Err(_) => return Err(ClientError::Timeout(wait)),
            };
            match Packet::decode(&buf[..len]) {
                Ok(packet) if packet.kind == PacketKind::ConnectResponse => {
                    tracing::debug!(player_id = packet.player_id, %server, "Connected to relay");
                    self.player_id = Some(packet.player_id);
                    return Ok(packet.player_id);
                }
                Ok(packet) => {
                    tracing::trace!(kind = %packet.kind, "Ignoring packet while connecting");
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Ignoring malformed packet while connecting");
                }
            }
        }
    }

    fn assigned_id(&self) -> Result<PlayerId, ClientError> {
        self.player_id.ok_or(ClientError::NotConnected)
    }

    /// Send a MOVE, ROTATE or DROP for this client's player.
    pub async fn send_move(&self, kind: PacketKind, data: MoveData) -> Result<(), ClientError> {
        let player_id = self.assigned_id()?;
        let packet = match kind {
            PacketKind::MovePiece => Packet::move_piece(player_id, data),
            PacketKind::RotatePiece => Packet::rotate_piece(player_id, data),
            PacketKind::DropPiece => Packet::drop_piece(player_id, data),
            other => return Err(ClientError::NotPieceAction(other)),
        };
        self.send(&packet).await
    }

    pub async fn send_board(&self, board: &Board) -> Result<(), ClientError> {
        let player_id = self.assigned_id()?;
        self.send(&Packet::board_update(player_id, board.snapshot()))
            .await
    }

    /// Send an arbitrary packet to the server.
    pub async fn send(&self, packet: &Packet) -> Result<(), ClientError> {
        if self.server.is_none() {
            return Err(ClientError::NotConnected);
        }
        self.socket.send(&packet.encode()).await?;
        Ok(())
    }

    /// Wait up to `wait` for the next packet. `Ok(None)` on timeout.
    pub async fn recv(&self, wait: Duration) -> Result<Option<Packet>, ClientError> {
        if self.server.is_none() {
            return Err(ClientError::NotConnected);
        }
        let mut buf = vec![0u8; PACKET_SIZE];
        match timeout_at(Instant::now() + wait, self.socket.recv(&mut buf)).await {
            Ok(received) => {
                let len = received?;
                Ok(Some(Packet::decode(&buf[..len])?))
            }
            Err(_) => Ok(None),
        }
    }

    /// Tell the server we are leaving. The client keeps its socket and can
    /// connect again.
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        let player_id = self.assigned_id()?;
        self.send(&Packet::disconnect(player_id)).await?;
        self.player_id = None;
        Ok(())
    }
}
