//! Datagram link to the device.
//!
//! [`Link`] wraps a bound [`tokio::net::UdpSocket`] behind an `Arc` so the
//! telemetry listener can block on `recv` while the controller sends from
//! another task. The link is connectionless: the send target is whatever
//! address the session locked on to, never a configured peer.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::error::CoreError;

/// Receive buffer size; matches the largest datagram the device emits.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Port the device firmware reports to by default.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared handle to the bound datagram socket.
#[derive(Debug, Clone)]
pub struct Link {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
}

impl Link {
    /// Bind to a local address, e.g. `0.0.0.0:8080` for all interfaces.
    pub async fn bind(addr: SocketAddr) -> Result<Self, CoreError> {
        tracing::debug!(%addr, "binding datagram socket");

        let socket = UdpSocket::bind(addr).await.map_err(|source| {
            tracing::error!(%addr, error = %source, "failed to bind datagram socket");
            CoreError::Bind { addr, source }
        })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| CoreError::Bind { addr, source })?;

        tracing::debug!(%local_addr, "datagram socket bound");

        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
        })
    }

    /// The address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next datagram.
    pub async fn recv(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        let (len, from) = self.socket.recv_from(buf).await?;
        tracing::trace!(%from, bytes = len, "datagram received");
        Ok((len, from))
    }

    /// Send one datagram. Fire-and-forget: no acknowledgment or retry.
    pub async fn send_to(&self, payload: &[u8], to: SocketAddr) -> std::io::Result<usize> {
        let sent = self.socket.send_to(payload, to).await?;
        tracing::trace!(%to, bytes = sent, "datagram sent");
        Ok(sent)
    }
}

/// Where the telemetry listener pulls datagrams from.
///
/// [`Link`] is the only production source; the seam lets a session run
/// against a replayed or failing feed.
pub trait DatagramSource: Send + Sync + 'static {
    fn recv(&self, buf: &mut [u8])
    -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send;
}

impl DatagramSource for Link {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        Link::recv(self, buf).await
    }
}
