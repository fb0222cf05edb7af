use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use devsim_frame::{read_packet, FrameError};
use devsim_transport::{accept_stream, bind_stream};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_READ_TIMEOUT;
use crate::error::Result;
use crate::handler::{Outcome, RequestHandler};

/// Pause after a failed accept before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Serves one request/response exchange per stream connection.
///
/// Each connection runs on its own task. The request is delimited by the
/// length in its header, not by the transport.
#[derive(Debug)]
pub struct StreamServer {
    listener: TcpListener,
    handler: RequestHandler,
    read_timeout: Duration,
}

impl StreamServer {
    pub async fn bind(addr: SocketAddr, handler: RequestHandler) -> Result<Self> {
        let listener = bind_stream(addr).await?;
        Ok(Self {
            listener,
            handler,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Override how long a connection may take to deliver its request.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes. Connections already accepted run to completion.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("stream server stopped");
                    return Ok(());
                }
                accepted = accept_stream(&self.listener) => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            // Descriptor exhaustion fails every accept until one frees up.
                            warn!(error = %err, "accept failed");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                            continue;
                        }
                    };
                    tokio::spawn(serve_connection(
                        stream,
                        peer,
                        self.handler.clone(),
                        self.read_timeout,
                    ));
                }
            }
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: RequestHandler,
    read_timeout: Duration,
) {
    let raw = match tokio::time::timeout(read_timeout, read_packet(&mut stream)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(FrameError::ConnectionClosed)) => {
            debug!(%peer, "peer disconnected before sending a full request");
            return;
        }
        Ok(Err(err)) => {
            debug!(%peer, error = %err, "request read failed");
            return;
        }
        Err(_) => {
            debug!(%peer, ?read_timeout, "request read timed out");
            return;
        }
    };

    match handler.process(&raw) {
        Ok(Outcome::Dropped) => debug!(%peer, "request dropped"),
        Ok(Outcome::Reply { packet, delay, .. }) => {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Err(err) = stream.write_all(&packet).await {
                debug!(%peer, error = %err, "failed sending reply");
                return;
            }
            debug!(%peer, len = packet.len(), "reply sent");
            if let Err(err) = stream.shutdown().await {
                debug!(%peer, error = %err, "shutdown after reply failed");
            }
        }
        Err(err) if err.is_malformed() => {
            warn!(%peer, error = %err, "rejected malformed request")
        }
        Err(err) => debug!(%peer, error = %err, "request abandoned"),
    }
}
