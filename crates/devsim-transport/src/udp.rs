use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Bind a datagram socket that serves requests on `addr`.
pub async fn bind_datagram(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })?;
    let local = socket.local_addr()?;
    info!(addr = %local, "listening on datagram socket");
    Ok(socket)
}

/// Open an ephemeral datagram socket connected to `remote`.
///
/// The local side binds to the unspecified address of the same family.
pub async fn connect_datagram(remote: SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = if remote.is_ipv6() {
        SocketAddr::from(([0u16; 8], 0))
    } else {
        SocketAddr::from(([0u8; 4], 0))
    };
    let socket = UdpSocket::bind(local)
        .await
        .map_err(|source| TransportError::Bind { addr: local, source })?;
    socket
        .connect(remote)
        .await
        .map_err(|source| TransportError::Connect {
            addr: remote,
            source,
        })?;
    debug!(%remote, "datagram socket connected");
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_and_exchange() {
        let server = bind_datagram("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let client = connect_datagram(server_addr).await.unwrap();
        client.send(b"hello").await.unwrap();

        let mut buf = [0u8; 16];
        let (n, from) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(from, client.local_addr().unwrap());
    }

    #[tokio::test]
    async fn bind_in_use_reports_address() {
        let first = bind_datagram("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = first.local_addr().unwrap();

        let err = bind_datagram(addr).await.unwrap_err();
        assert!(matches!(err, TransportError::Bind { addr: a, .. } if a == addr));
    }
}
