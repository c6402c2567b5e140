//! Unprivileged TCP handshake probing.
//!
//! When raw ARP is unavailable, liveness is inferred from a connect
//! attempt against a port nearly every stack answers on: an accepted or
//! actively refused connection proves a host is up, only silence does
//! not.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

const HANDSHAKE_PORT: u16 = 443;

/// Returns `true` when `addr` demonstrably exists on the network.
pub async fn handshake_probe(addr: IpAddr, wait: Duration) -> bool {
    let socket_addr = SocketAddr::new(addr, HANDSHAKE_PORT);
    match timeout(wait, TcpStream::connect(socket_addr)).await {
        // Accepted or refused: either way something answered.
        Ok(Ok(_)) | Ok(Err(_)) => true,
        Err(_elapsed) => false,
    }
}

/// Attempts a connect against a specific port; `Some(stream)` only when
/// the port is open.
pub async fn connect(
    addr: IpAddr,
    port: u16,
    wait: Duration,
) -> Option<TcpStream> {
    let socket_addr = SocketAddr::new(addr, port);
    match timeout(wait, TcpStream::connect(socket_addr)).await {
        Ok(Ok(stream)) => Some(stream),
        Ok(Err(_)) | Err(_) => None,
    }
}
