use std::net::SocketAddr;
use std::time::Duration;

use devsim_frame::{decode_frame, Frame, REQ_PING, REQ_START, REQ_STATUS, REQ_STOP};
use tracing::debug;

use crate::error::Result;
use crate::exchange::{DatagramExchange, Exchange, StreamExchange};
use crate::retry::{self, RetryPolicy};

pub type DatagramClient = DeviceClient<DatagramExchange>;
pub type StreamClient = DeviceClient<StreamExchange>;

/// Request/response client over one transport.
///
/// Every reply is passed through [`decode_frame`]; a corrupted reply surfaces
/// as `ClientError::Frame` and counts as a failed attempt when retrying.
#[derive(Debug, Clone)]
pub struct DeviceClient<X> {
    exchange: X,
}

impl DeviceClient<DatagramExchange> {
    pub fn datagram(addr: SocketAddr) -> Self {
        Self::new(DatagramExchange::new(addr))
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self::new(self.exchange.with_timeout(timeout))
    }
}

impl DeviceClient<StreamExchange> {
    pub fn stream(addr: SocketAddr) -> Self {
        Self::new(StreamExchange::new(addr))
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self::new(self.exchange.with_timeout(timeout))
    }
}

impl<X: Exchange> DeviceClient<X> {
    pub fn new(exchange: X) -> Self {
        Self { exchange }
    }

    pub fn exchange(&self) -> &X {
        &self.exchange
    }

    /// Encode, send, wait for and decode exactly one reply.
    pub async fn request_once(&self, msg_type: u8, payload: &[u8]) -> Result<Frame> {
        let request = Frame::new(msg_type, payload.to_vec()).to_bytes()?;
        let reply = self.exchange.exchange(&request).await?;
        let frame = decode_frame(&reply)?;
        debug!(
            request = msg_type,
            response = frame.msg_type,
            len = frame.payload.len(),
            "response received"
        );
        Ok(frame)
    }

    /// Send a request, optionally retrying under `policy`.
    pub async fn request(
        &self,
        msg_type: u8,
        payload: &[u8],
        policy: Option<&RetryPolicy>,
    ) -> Result<Frame> {
        match policy {
            Some(policy) => {
                retry::request(policy, move || self.request_once(msg_type, payload)).await
            }
            None => self.request_once(msg_type, payload).await,
        }
    }

    pub async fn ping(&self, policy: Option<&RetryPolicy>) -> Result<Frame> {
        self.request(REQ_PING, &[], policy).await
    }

    pub async fn status(&self, policy: Option<&RetryPolicy>) -> Result<Frame> {
        self.request(REQ_STATUS, &[], policy).await
    }

    pub async fn start(&self, policy: Option<&RetryPolicy>) -> Result<Frame> {
        self.request(REQ_START, &[], policy).await
    }

    pub async fn stop(&self, policy: Option<&RetryPolicy>) -> Result<Frame> {
        self.request(REQ_STOP, &[], policy).await
    }
}
