use std::net::SocketAddr;

use bytes::Bytes;

use crate::metrics::ServerMetrics;
use crate::protocol::{pad_frame, Packet, PacketKind};

use super::PacketDispatcher;

impl PacketDispatcher {
    /// Decode one received datagram and act on it. Malformed datagrams and
    /// unknown kinds are dropped without a reply.
    pub async fn handle_datagram(&self, datagram: Bytes, from: SocketAddr) {
        let packet = match Packet::decode(&datagram) {
            Ok(packet) => packet,
            Err(err) => {
                ServerMetrics::increment(&self.metrics.malformed_packets);
                tracing::debug!(
                    %from,
                    len = datagram.len(),
                    error = %err,
                    "Dropping malformed datagram"
                );
                return;
            }
        };

        match packet.kind {
            PacketKind::ConnectRequest => {
                self.handle_connect(from).await;
            }
            PacketKind::Disconnect => {
                self.handle_disconnect(from).await;
            }
            PacketKind::MovePiece | PacketKind::RotatePiece | PacketKind::DropPiece => {
                self.handle_piece_action(&packet, pad_frame(&datagram), from)
                    .await;
            }
            PacketKind::BoardUpdate => {
                self.handle_board_update(pad_frame(&datagram), from).await;
            }
            PacketKind::ConnectResponse | PacketKind::GameStart => {
                tracing::debug!(
                    %from,
                    kind = %packet.kind,
                    "Ignoring server-originated packet kind sent by client"
                );
            }
        }
    }
}
