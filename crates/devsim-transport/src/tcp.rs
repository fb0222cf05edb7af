use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Bind and listen for stream connections on `addr`.
pub async fn bind_stream(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    info!(addr = %local, "listening on stream socket");
    Ok(listener)
}

/// Accept the next incoming connection.
pub async fn accept_stream(listener: &TcpListener) -> Result<(TcpStream, SocketAddr)> {
    let (stream, peer) = listener.accept().await.map_err(TransportError::Accept)?;
    debug!(%peer, "accepted connection");
    Ok((stream, peer))
}

/// Connect to a listening stream socket, giving up after `timeout`.
pub async fn connect_stream(addr: SocketAddr, timeout: Duration) -> Result<TcpStream> {
    let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(TransportError::Connect { addr, source }),
        Err(_) => {
            return Err(TransportError::Connect {
                addr,
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connect timed out after {timeout:?}"),
                ),
            })
        }
    };
    stream.set_nodelay(true)?;
    debug!(%addr, "connected to stream socket");
    Ok(stream)
}
