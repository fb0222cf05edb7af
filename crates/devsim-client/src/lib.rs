//! Client side of the device simulator protocol.
//!
//! [`DeviceClient`] sends one request per exchange over either transport and
//! validates the reply with the frame codec. [`retry`] wraps any fallible
//! async call in bounded, exponentially backed-off re-attempts.

pub mod client;
pub mod error;
pub mod exchange;
pub mod retry;

pub use client::{DatagramClient, DeviceClient, StreamClient};
pub use error::{ClientError, Result};
pub use exchange::{
    DatagramExchange, Exchange, StreamExchange, DEFAULT_DATAGRAM_TIMEOUT, DEFAULT_STREAM_TIMEOUT,
};
pub use retry::{request, Backoff, RetryPolicy};
