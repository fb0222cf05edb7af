use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use devsim_frame::read_packet;
use devsim_transport::{connect_datagram, connect_stream};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::trace;

use crate::error::{ClientError, Result};

/// Default wait for a datagram reply.
pub const DEFAULT_DATAGRAM_TIMEOUT: Duration = Duration::from_millis(1500);

/// Default connect and read timeout for stream exchanges.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest datagram the client will accept.
const MAX_DATAGRAM: usize = 64 * 1024;

/// One request out, one raw reply packet back.
pub trait Exchange {
    fn exchange(&self, request: &[u8]) -> impl Future<Output = Result<BytesMut>> + Send;
}

/// Sends each request from a fresh ephemeral datagram socket.
///
/// A new socket per attempt keeps a late reply to an earlier attempt from
/// being read as the answer to the current one.
#[derive(Debug, Clone)]
pub struct DatagramExchange {
    addr: SocketAddr,
    timeout: Duration,
}

impl DatagramExchange {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_DATAGRAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Exchange for DatagramExchange {
    async fn exchange(&self, request: &[u8]) -> Result<BytesMut> {
        let socket = connect_datagram(self.addr).await?;
        socket.send(request).await?;

        let mut buf = BytesMut::zeroed(MAX_DATAGRAM);
        let n = timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;
        buf.truncate(n);
        trace!(addr = %self.addr, len = n, "datagram reply");
        Ok(buf)
    }
}

/// Opens one connection per request and reads exactly one packet back.
#[derive(Debug, Clone)]
pub struct StreamExchange {
    addr: SocketAddr,
    timeout: Duration,
}

impl StreamExchange {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_STREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Exchange for StreamExchange {
    async fn exchange(&self, request: &[u8]) -> Result<BytesMut> {
        let mut stream = connect_stream(self.addr, self.timeout).await?;
        stream.write_all(request).await?;

        let packet = timeout(self.timeout, read_packet(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;
        trace!(addr = %self.addr, len = packet.len(), "stream reply");
        Ok(packet)
    }
}
