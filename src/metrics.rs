use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Relay counters. Updated with relaxed atomics from the receive loop and
/// from worker tasks.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Transport
    pub datagrams_received: AtomicU64,
    pub receive_errors: AtomicU64,
    pub malformed_packets: AtomicU64,
    pub send_failures: AtomicU64,

    // Room membership
    pub players_admitted: AtomicU64,
    pub connects_dropped_room_full: AtomicU64,
    pub disconnects: AtomicU64,
    pub games_started: AtomicU64,

    // Relay
    pub piece_actions_relayed: AtomicU64,
    pub piece_actions_rejected: AtomicU64,
    pub board_updates_relayed: AtomicU64,
}

/// Point-in-time copy of [`ServerMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub datagrams_received: u64,
    pub receive_errors: u64,
    pub malformed_packets: u64,
    pub send_failures: u64,
    pub players_admitted: u64,
    pub connects_dropped_room_full: u64,
    pub disconnects: u64,
    pub games_started: u64,
    pub piece_actions_relayed: u64,
    pub piece_actions_rejected: u64,
    pub board_updates_relayed: u64,
}

impl ServerMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            datagrams_received: load(&self.datagrams_received),
            receive_errors: load(&self.receive_errors),
            malformed_packets: load(&self.malformed_packets),
            send_failures: load(&self.send_failures),
            players_admitted: load(&self.players_admitted),
            connects_dropped_room_full: load(&self.connects_dropped_room_full),
            disconnects: load(&self.disconnects),
            games_started: load(&self.games_started),
            piece_actions_relayed: load(&self.piece_actions_relayed),
            piece_actions_rejected: load(&self.piece_actions_rejected),
            board_updates_relayed: load(&self.board_updates_relayed),
        }
    }
}
