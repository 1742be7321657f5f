use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::game::{is_valid_placement, is_valid_rotation, Board, Piece, PlacementError};
use crate::metrics::ServerMetrics;
use crate::protocol::{Packet, PacketKind, PlayerId};
use crate::transport::DatagramSender;

/// Players per room. Fixed; not negotiated with clients.
pub const ROOM_CAPACITY: usize = 3;

/// A room member. The board lives exactly as long as the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub address: SocketAddr,
    pub board: Board,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, address: SocketAddr) -> Self {
        Self {
            id,
            address,
            board: Board::new(),
        }
    }
}

/// The single game room.
///
/// Every operation takes the same lock, including the send loop of a
/// broadcast, so a concurrent join or leave never sees a half-updated
/// member list. Validation and broadcast are separate critical sections.
pub struct RoomRegistry {
    players: Mutex<HashMap<PlayerId, Player>>,
    sender: Arc<dyn DatagramSender>,
    metrics: Arc<ServerMetrics>,
}

impl RoomRegistry {
    pub fn new(sender: Arc<dyn DatagramSender>, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            players: Mutex::new(HashMap::with_capacity(ROOM_CAPACITY)),
            sender,
            metrics,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        ROOM_CAPACITY
    }

    /// Insert `player` unless the room is full. No mutation on failure.
    pub async fn add_player(&self, player: Player) -> bool {
        let mut players = self.players.lock().await;
        if players.len() >= ROOM_CAPACITY {
            return false;
        }
        players.insert(player.id, player);
        true
    }

    /// `true` iff a member with `player_id` was present and is now gone.
    pub async fn remove_player(&self, player_id: PlayerId) -> bool {
        self.players.lock().await.remove(&player_id).is_some()
    }

    /// Remove the member bound to `address`, returning its id.
    pub async fn remove_by_address(&self, address: SocketAddr) -> Option<PlayerId> {
        let mut players = self.players.lock().await;
        let player_id = players
            .values()
            .find(|player| player.address == address)
            .map(|player| player.id)?;
        players.remove(&player_id);
        Some(player_id)
    }

    pub async fn find_by_address(&self, address: SocketAddr) -> Option<PlayerId> {
        self.players
            .lock()
            .await
            .values()
            .find(|player| player.address == address)
            .map(|player| player.id)
    }

    pub async fn is_full(&self) -> bool {
        self.players.lock().await.len() >= ROOM_CAPACITY
    }

    pub async fn is_empty(&self) -> bool {
        self.players.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.players.lock().await.len()
    }

    /// Snapshot copy of the members, ordered by id.
    pub async fn list_players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.lock().await.values().cloned().collect();
        players.sort_by_key(|player| player.id);
        players
    }

    /// Encode `packet` and send it to every member except `exclude`.
    /// `None` excludes nobody. Returns the number of send attempts.
    pub async fn broadcast(&self, packet: &Packet, exclude: Option<SocketAddr>) -> usize {
        self.broadcast_frame(&packet.encode(), exclude).await
    }

    /// Send an already-encoded frame to every member except `exclude`.
    /// Per-recipient send failures are logged and do not stop the loop.
    pub async fn broadcast_frame(&self, frame: &[u8], exclude: Option<SocketAddr>) -> usize {
        let players = self.players.lock().await;
        let mut attempts = 0;

        for player in players.values() {
            if Some(player.address) == exclude {
                continue;
            }
            attempts += 1;
            if let Err(err) = self.sender.send_datagram(frame, player.address).await {
                ServerMetrics::increment(&self.metrics.send_failures);
                warn!(
                    player_id = player.id,
                    addr = %player.address,
                    error = %err,
                    "Failed to relay packet to player"
                );
            }
        }

        attempts
    }

    /// Lock `piece` into a member's board. `None` if the player is unknown.
    pub async fn apply_to_board(
        &self,
        player_id: PlayerId,
        piece: &Piece,
    ) -> Option<Result<(), PlacementError>> {
        let mut players = self.players.lock().await;
        let player = players.get_mut(&player_id)?;
        Some(player.board.apply(piece))
    }

    /// Check a piece action against the sender's board.
    ///
    /// MOVE and DROP check placement at the packet's `(x, y)`; ROTATE checks
    /// the rotated shape at the same anchor. Unknown players, unknown piece
    /// types and non-action packets are invalid.
    pub async fn validate_move(&self, player_id: PlayerId, packet: &Packet) -> bool {
        let players = self.players.lock().await;
        let Some(player) = players.get(&player_id) else {
            debug!(player_id, "Move from unknown player");
            return false;
        };
        let Some(data) = packet.move_data() else {
            return false;
        };
        let Some(piece) = Piece::from_move(data) else {
            debug!(player_id, piece_type = data.piece_type, "Unknown piece type");
            return false;
        };

        match packet.kind {
            PacketKind::MovePiece | PacketKind::DropPiece => {
                is_valid_placement(&player.board, &piece, data.x, data.y)
            }
            PacketKind::RotatePiece => is_valid_rotation(&player.board, &piece, data.rotation),
            _ => false,
        }
    }
}
