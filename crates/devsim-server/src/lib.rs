//! Request handlers for the device simulator.
//!
//! Both transports share one interpretation path:
//! drop check, decode, decide, apply, encode, corrupt check, delay, transmit.
//! They differ only in how a request packet is delimited and how the reply
//! travels back.

pub mod config;
pub mod datagram;
pub mod error;
pub mod handler;
pub mod interpret;
pub mod stream;

use std::future::Future;
use std::net::SocketAddr;

use devsim_device::Device;
use tokio::sync::watch;
use tracing::info;

pub use config::{ServerConfig, DEFAULT_READ_TIMEOUT};
pub use datagram::DatagramServer;
pub use error::{Result, ServerError};
pub use handler::{Outcome, RequestHandler};
pub use interpret::{decide, exchange, Decision};
pub use stream::StreamServer;

/// Both servers bound to one shared device.
#[derive(Debug)]
pub struct Simulator {
    datagram: DatagramServer,
    stream: StreamServer,
}

impl Simulator {
    /// Bind the datagram and stream endpoints from `config`.
    pub async fn bind(config: &ServerConfig, device: Device) -> Result<Self> {
        let handler = RequestHandler::new(device);
        let datagram = DatagramServer::bind(config.datagram_addr, handler.clone()).await?;
        let stream = StreamServer::bind(config.stream_addr, handler)
            .await?
            .with_read_timeout(config.read_timeout);
        Ok(Self { datagram, stream })
    }

    pub fn datagram_addr(&self) -> Result<SocketAddr> {
        self.datagram.local_addr()
    }

    pub fn stream_addr(&self) -> Result<SocketAddr> {
        self.stream.local_addr()
    }

    /// Serve both transports until `shutdown` completes or one of them fails.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (tx, rx) = watch::channel(());
        let datagram_rx = rx.clone();
        let stream_rx = rx;

        tokio::try_join!(
            self.datagram.run_until(signalled(datagram_rx)),
            self.stream.run_until(signalled(stream_rx)),
            async move {
                shutdown.await;
                info!("shutdown requested");
                let _ = tx.send(());
                Ok::<(), ServerError>(())
            }
        )?;
        Ok(())
    }
}

async fn signalled(mut rx: watch::Receiver<()>) {
    let _ = rx.changed().await;
}
