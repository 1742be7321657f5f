use std::net::SocketAddr;

use crate::metrics::ServerMetrics;
use crate::protocol::Packet;

use super::{PacketDispatcher, Player, ROOM_CAPACITY};

impl PacketDispatcher {
    pub(super) async fn handle_connect(&self, from: SocketAddr) {
        let mut next_player_id = self.next_player_id.lock().await;

        if self.running.is_cancelled() {
            tracing::debug!(%from, "Server is shutting down; dropping connect request");
            return;
        }

        if let Some(player_id) = self.room.find_by_address(from).await {
            tracing::debug!(player_id, %from, "Repeated connect request; resending assigned id");
            self.send_to(&Packet::connect_response(player_id), from).await;
            return;
        }

        if self.room.is_full().await {
            ServerMetrics::increment(&self.metrics.connects_dropped_room_full);
            tracing::info!(
                %from,
                capacity = ROOM_CAPACITY,
                "Room is full; dropping connect request"
            );
            return;
        }

        let player_id = *next_player_id;
        let Some(following) = player_id.checked_add(1) else {
            tracing::error!(%from, "Player id space exhausted; dropping connect request");
            return;
        };

        if !self.room.add_player(Player::new(player_id, from)).await {
            // Capacity was checked under the admission lock.
            tracing::warn!(player_id, %from, "Room rejected player after capacity check");
            return;
        }
        *next_player_id = following;
        ServerMetrics::increment(&self.metrics.players_admitted);

        let members = self.room.len().await;
        tracing::info!(player_id, %from, members, capacity = ROOM_CAPACITY, "Player connected");
        self.send_to(&Packet::connect_response(player_id), from).await;

        if members == ROOM_CAPACITY {
            self.start_game().await;
        }
    }

    /// Broadcast GAME_START to every member.
    pub(super) async fn start_game(&self) {
        let notified = self.room.broadcast(&Packet::game_start(), None).await;
        ServerMetrics::increment(&self.metrics.games_started);
        tracing::info!(notified, "Room full; game started");
    }

    /// Remove whoever is bound to `from`. The player id inside the packet is
    /// not consulted.
    pub(super) async fn handle_disconnect(&self, from: SocketAddr) {
        let _admission = self.next_player_id.lock().await;

        match self.room.remove_by_address(from).await {
            Some(player_id) => {
                ServerMetrics::increment(&self.metrics.disconnects);
                let remaining = self.room.len().await;
                tracing::info!(player_id, %from, remaining, "Player disconnected");
            }
            None => {
                tracing::debug!(%from, "Disconnect from unknown address");
            }
        }
    }

    /// Send DISCONNECT to every member, each carrying its own id. Returns
    /// the number of members notified.
    pub async fn notify_shutdown(&self) -> usize {
        let _admission = self.next_player_id.lock().await;

        let players = self.room.list_players().await;
        for player in &players {
            self.send_to(&Packet::disconnect(player.id), player.address)
                .await;
        }
        players.len()
    }
}
