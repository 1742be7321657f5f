use std::net::SocketAddr;

use bytes::Bytes;

use crate::metrics::ServerMetrics;
use crate::protocol::Packet;

use super::PacketDispatcher;

impl PacketDispatcher {
    /// Relay a MOVE/ROTATE/DROP frame verbatim to every other member if it
    /// fits the sending player's board.
    pub(super) async fn handle_piece_action(
        &self,
        packet: &Packet,
        frame: Bytes,
        from: SocketAddr,
    ) {
        if !self.room.validate_move(packet.player_id, packet).await {
            ServerMetrics::increment(&self.metrics.piece_actions_rejected);
            tracing::debug!(
                player_id = packet.player_id,
                kind = %packet.kind,
                %from,
                "Rejected invalid piece action"
            );
            return;
        }

        let relayed = self.room.broadcast_frame(&frame, Some(from)).await;
        ServerMetrics::increment(&self.metrics.piece_actions_relayed);
        tracing::trace!(
            player_id = packet.player_id,
            kind = %packet.kind,
            relayed,
            "Relayed piece action"
        );
    }

    /// BOARD_UPDATE frames are forwarded without inspection.
    pub(super) async fn handle_board_update(&self, frame: Bytes, from: SocketAddr) {
        let relayed = self.room.broadcast_frame(&frame, Some(from)).await;
        ServerMetrics::increment(&self.metrics.board_updates_relayed);
        tracing::trace!(%from, relayed, "Relayed board update");
    }
}
