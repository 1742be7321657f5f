use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::metrics::ServerMetrics;
use crate::protocol::Packet;
use crate::transport::DatagramSender;

use super::PacketDispatcher;

/// Captures every outbound datagram instead of touching the network.
#[derive(Default)]
pub(super) struct RecordingSender {
    sent: Mutex<Vec<(SocketAddr, Bytes)>>,
    failing: Mutex<Vec<SocketAddr>>,
}

impl RecordingSender {
    pub(super) fn fail_sends_to(&self, addr: SocketAddr) {
        self.failing.lock().unwrap().push(addr);
    }

    pub(super) fn take(&self) -> Vec<(SocketAddr, Bytes)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Drain and decode everything sent so far.
    pub(super) fn take_packets(&self) -> Vec<(SocketAddr, Packet)> {
        self.take()
            .into_iter()
            .map(|(addr, frame)| {
                let packet = Packet::decode(&frame).expect("server sent a valid frame");
                (addr, packet)
            })
            .collect()
    }
}

#[async_trait]
impl DatagramSender for RecordingSender {
    async fn send_datagram(&self, frame: &[u8], target: SocketAddr) -> io::Result<()> {
        if self.failing.lock().unwrap().contains(&target) {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target, Bytes::copy_from_slice(frame)));
        Ok(())
    }
}

pub(super) fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

pub(super) type TestDispatcher = (PacketDispatcher, Arc<RecordingSender>, Arc<ServerMetrics>);

pub(super) fn create_test_dispatcher() -> TestDispatcher {
    let sender = Arc::new(RecordingSender::default());
    let metrics = Arc::new(ServerMetrics::new());
    let dispatcher = PacketDispatcher::new(
        Arc::clone(&sender) as Arc<dyn DatagramSender>,
        Arc::clone(&metrics),
        CancellationToken::new(),
    );
    (dispatcher, sender, metrics)
}
