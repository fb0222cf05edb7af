//! Socket plumbing for the device simulator.
//!
//! Provides the two network surfaces the simulator speaks over:
//! - Datagram sockets (UDP), one complete message per packet
//! - Stream sockets (TCP), one request/response exchange per connection
//!
//! This is the lowest layer. Framing, fault injection and device state all
//! build on the sockets handed out here.

pub mod endpoint;
pub mod error;
pub mod tcp;
pub mod udp;

pub use endpoint::{Endpoint, DEFAULT_DATAGRAM_PORT, DEFAULT_HOST, DEFAULT_STREAM_PORT};
pub use error::{Result, TransportError};
pub use tcp::{accept_stream, bind_stream, connect_stream};
pub use udp::{bind_datagram, connect_datagram};
