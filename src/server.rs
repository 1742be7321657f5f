use crate::metrics::ServerMetrics;
use crate::protocol::PACKET_SIZE;
use crate::transport::{DatagramSender, UdpEndpoint};
use crate::worker_pool::WorkerPool;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

mod connection_handlers;
mod dispatcher;
mod message_router;
mod relay_handlers;
mod room_registry;
#[cfg(test)]
mod room_registry_tests;
#[cfg(test)]
mod test_support;

pub use dispatcher::PacketDispatcher;
pub use room_registry::{Player, RoomRegistry, ROOM_CAPACITY};

/// Fatal startup errors. Everything after a successful bind is logged and
/// survived.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind UDP endpoint on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read local address of UDP endpoint: {0}")]
    LocalAddr(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub worker_threads: usize,
    /// Upper bound on one blocking receive; only makes shutdown observable.
    pub recv_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 12345)),
            worker_threads: 4,
            recv_timeout: Duration::from_secs(1),
        }
    }
}

/// The relay: one UDP endpoint, one receive loop, a worker pool, one room.
pub struct RelayServer {
    endpoint: Arc<UdpEndpoint>,
    local_addr: SocketAddr,
    dispatcher: Arc<PacketDispatcher>,
    pool: WorkerPool,
    config: ServerConfig,
    metrics: Arc<ServerMetrics>,
    running: CancellationToken,
    stopping: AtomicBool,
}

impl RelayServer {
    /// Bind the endpoint and start the worker pool. Must be called from
    /// within a tokio runtime.
    pub async fn bind(config: ServerConfig) -> Result<Arc<Self>, ServerError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        let local_addr = socket.local_addr().map_err(ServerError::LocalAddr)?;
        let endpoint = Arc::new(UdpEndpoint::new(socket));

        let metrics = Arc::new(ServerMetrics::new());
        let running = CancellationToken::new();
        let dispatcher = Arc::new(PacketDispatcher::new(
            Arc::clone(&endpoint) as Arc<dyn DatagramSender>,
            Arc::clone(&metrics),
            running.clone(),
        ));
        let pool = WorkerPool::new(config.worker_threads);

        tracing::info!(
            addr = %local_addr,
            workers = pool.worker_count(),
            "Relay server bound"
        );

        Ok(Arc::new(Self {
            endpoint,
            local_addr,
            dispatcher,
            pool,
            config,
            metrics,
            running,
            stopping: AtomicBool::new(false),
        }))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn room(&self) -> &RoomRegistry {
        self.dispatcher.room()
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        !self.running.is_cancelled()
    }

    /// Receive loop. Returns once [`shutdown`](Self::shutdown) has been
    /// called, the worker pool has drained its in-flight tasks and the
    /// endpoint is closed.
    pub async fn run(&self) {
        if let Some(socket) = self.endpoint.socket().await {
            tracing::info!(addr = %self.local_addr, "Relay server listening");
            self.receive_loop(&socket).await;
        }

        self.pool.shutdown().await;
        self.endpoint.close().await;
        tracing::info!(
            metrics = ?self.metrics.snapshot(),
            "Relay server stopped"
        );
    }

    async fn receive_loop(&self, socket: &UdpSocket) {
        let mut buf = vec![0u8; PACKET_SIZE];

        loop {
            let received = tokio::select! {
                biased;
                () = self.running.cancelled() => break,
                result = timeout(self.config.recv_timeout, socket.recv_from(&mut buf)) => result,
            };

            let (len, from) = match received {
                // Timeout only exists to re-check the run flag.
                Err(_elapsed) => continue,
                Ok(Err(err)) => {
                    ServerMetrics::increment(&self.metrics.receive_errors);
                    tracing::warn!(error = %err, "Failed to receive datagram");
                    continue;
                }
                Ok(Ok(received)) => received,
            };

            ServerMetrics::increment(&self.metrics.datagrams_received);
            let datagram = Bytes::copy_from_slice(&buf[..len]);
            let dispatcher = Arc::clone(&self.dispatcher);
            if let Err(err) = self.pool.submit(async move {
                dispatcher.handle_datagram(datagram, from).await;
            }) {
                tracing::error!(
                    error = %err,
                    %from,
                    "Worker pool rejected datagram task while server is running"
                );
            }
        }
    }

    /// Stop the server. Only the first call has any effect: it flips the run
    /// flag, sends DISCONNECT to every member and closes the endpoint. The
    /// port is released once the receive loop and in-flight sends let go of
    /// the socket.
    pub async fn shutdown(&self) {
        if self.stopping.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!("Relay server shutting down");
        self.running.cancel();

        let notified = self.dispatcher.notify_shutdown().await;
        tracing::info!(notified, "Sent disconnect notification to connected players");

        self.endpoint.close().await;
    }

    pub async fn is_endpoint_closed(&self) -> bool {
        self.endpoint.is_closed().await
    }
}
