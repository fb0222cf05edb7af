use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use devsim_transport::bind_datagram;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::handler::{Outcome, RequestHandler};

/// Receive buffer size; large enough for any UDP payload.
const RECV_BUFFER_SIZE: usize = 64 * 1024;

/// Serves requests arriving as datagrams.
///
/// Each datagram is one complete request and is handled on its own task, so
/// a delayed reply never holds up the next arrival.
#[derive(Debug)]
pub struct DatagramServer {
    socket: Arc<UdpSocket>,
    handler: RequestHandler,
}

impl DatagramServer {
    pub async fn bind(addr: SocketAddr, handler: RequestHandler) -> Result<Self> {
        let socket = bind_datagram(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
            handler,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes. Replies already scheduled still go out.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("datagram server stopped");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(received) => received,
                        Err(err) => {
                            // ICMP errors from earlier sends can surface here.
                            debug!(error = %err, "datagram receive failed");
                            continue;
                        }
                    };
                    let packet = buf[..len].to_vec();
                    tokio::spawn(serve_datagram(
                        Arc::clone(&self.socket),
                        self.handler.clone(),
                        packet,
                        peer,
                    ));
                }
            }
        }
    }
}

async fn serve_datagram(
    socket: Arc<UdpSocket>,
    handler: RequestHandler,
    packet: Vec<u8>,
    peer: SocketAddr,
) {
    match handler.process(&packet) {
        Ok(Outcome::Dropped) => debug!(%peer, "request dropped"),
        Ok(Outcome::Reply { packet, delay, .. }) => {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match socket.send_to(&packet, peer).await {
                Ok(_) => debug!(%peer, len = packet.len(), "reply sent"),
                Err(err) => warn!(%peer, error = %err, "failed sending reply"),
            }
        }
        Err(err) if err.is_malformed() => {
            warn!(%peer, error = %err, "rejected malformed request")
        }
        Err(err) => debug!(%peer, error = %err, "request abandoned"),
    }
}
