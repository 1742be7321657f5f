use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::metrics::ServerMetrics;
use crate::protocol::{Packet, PlayerId};
use crate::transport::DatagramSender;

use super::RoomRegistry;

/// Per-datagram packet handling, run on worker tasks.
///
/// Owns the room and the id counter. Admission (duplicate check, capacity
/// check, id allocation, insert) runs under one lock so concurrent connects
/// can neither overfill the room nor burn ids on rejected requests. Once
/// `running` is cancelled no further players are admitted.
pub struct PacketDispatcher {
    pub(super) room: RoomRegistry,
    pub(super) sender: Arc<dyn DatagramSender>,
    pub(super) next_player_id: Mutex<PlayerId>,
    pub(super) metrics: Arc<ServerMetrics>,
    pub(super) running: CancellationToken,
}

impl PacketDispatcher {
    pub fn new(
        sender: Arc<dyn DatagramSender>,
        metrics: Arc<ServerMetrics>,
        running: CancellationToken,
    ) -> Self {
        Self {
            room: RoomRegistry::new(Arc::clone(&sender), Arc::clone(&metrics)),
            sender,
            next_player_id: Mutex::new(1),
            metrics,
            running,
        }
    }

    pub fn room(&self) -> &RoomRegistry {
        &self.room
    }

    /// Encode and send one packet to one address. Failures are logged.
    pub(super) async fn send_to(&self, packet: &Packet, target: SocketAddr) -> bool {
        match self.sender.send_datagram(&packet.encode(), target).await {
            Ok(()) => true,
            Err(err) => {
                ServerMetrics::increment(&self.metrics.send_failures);
                tracing::warn!(
                    kind = %packet.kind,
                    %target,
                    error = %err,
                    "Failed to send packet"
                );
                false
            }
        }
    }
}
