use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;

/// Outbound half of the datagram endpoint.
///
/// Implementations must tolerate concurrent callers: the room registry and
/// the connection handlers send from several worker tasks at once.
#[async_trait]
pub trait DatagramSender: Send + Sync {
    async fn send_datagram(&self, frame: &[u8], target: SocketAddr) -> io::Result<()>;
}

/// The server's UDP socket, closable while the server itself is still shared.
///
/// Callers borrow the socket per operation. Once [`close`](Self::close) has
/// run and those borrows end, the descriptor is released and the port can be
/// bound again.
pub struct UdpEndpoint {
    socket: RwLock<Option<Arc<UdpSocket>>>,
}

impl UdpEndpoint {
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket: RwLock::new(Some(Arc::new(socket))),
        }
    }

    /// A handle to the open socket, or `None` after close.
    pub async fn socket(&self) -> Option<Arc<UdpSocket>> {
        self.socket.read().await.clone()
    }

    /// Drop the endpoint's socket. Returns `false` if it was already closed.
    pub async fn close(&self) -> bool {
        self.socket.write().await.take().is_some()
    }

    pub async fn is_closed(&self) -> bool {
        self.socket.read().await.is_none()
    }
}

#[async_trait]
impl DatagramSender for UdpEndpoint {
    async fn send_datagram(&self, frame: &[u8], target: SocketAddr) -> io::Result<()> {
        let Some(socket) = self.socket().await else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "UDP endpoint is closed"));
        };
        let sent = socket.send_to(frame, target).await?;
        if sent != frame.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {sent} of {} bytes to {target}", frame.len()),
            ));
        }
        Ok(())
    }
}
