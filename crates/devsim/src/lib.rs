//! Fault-injecting device simulator for protocol client testing.
//!
//! devsim answers a small request/response protocol over UDP and TCP on behalf
//! of a simulated device, and can drop, corrupt or delay its replies so client
//! retry and validation logic can be exercised deterministically.
//!
//! # Crate Structure
//!
//! - [`transport`]: socket setup and endpoint parsing
//! - [`frame`]: checksummed frame codec and stream packet reader
//! - [`device`]: state machine, fault settings and random sources
//! - [`server`]: datagram and stream request handlers
//! - [`client`]: retrying request client

/// Re-export transport types.
pub mod transport {
    pub use devsim_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use devsim_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use devsim_device::*;
}

/// Re-export server types.
pub mod server {
    pub use devsim_server::*;
}

/// Re-export client types.
pub mod client {
    pub use devsim_client::*;
}
