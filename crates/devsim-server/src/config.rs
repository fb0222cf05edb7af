use std::net::SocketAddr;
use std::time::Duration;

use devsim_transport::{DEFAULT_DATAGRAM_PORT, DEFAULT_STREAM_PORT};

/// How long a stream connection may take to deliver its request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the simulator's network surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Datagram (UDP) bind address. Default: `127.0.0.1:9000`.
    pub datagram_addr: SocketAddr,
    /// Stream (TCP) bind address. Default: `127.0.0.1:9001`.
    pub stream_addr: SocketAddr,
    /// Per-connection request read timeout on the stream transport.
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            datagram_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_DATAGRAM_PORT)),
            stream_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_STREAM_PORT)),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Both surfaces on ephemeral loopback ports.
    pub fn ephemeral() -> Self {
        Self {
            datagram_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            stream_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..Self::default()
        }
    }
}
