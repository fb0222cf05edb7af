use std::time::Duration;

use bytes::BytesMut;
use devsim_device::Device;
use devsim_frame::{decode_frame, FrameError};
use tracing::debug;

use crate::interpret::exchange;

/// What a transport should do with one request.
#[derive(Debug)]
pub enum Outcome {
    /// The request was lost; send nothing.
    Dropped,
    /// Send `packet` after waiting `delay`.
    Reply {
        packet: BytesMut,
        delay: Option<Duration>,
        corrupted: bool,
    },
}

/// Transport-independent request processing.
///
/// Fault settings are read once per request; a concurrent `set_faults`
/// affects the next request, not the one in flight.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    device: Device,
}

impl RequestHandler {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Run one raw request through drop, decode, decide/apply, encode and
    /// corrupt. The delay is returned for the transport to schedule.
    ///
    /// A request that fails to decode is returned as `Err` and must not be
    /// answered.
    pub fn process(&self, raw: &[u8]) -> Result<Outcome, FrameError> {
        let mut faults = self.device.fault_pipeline();
        if faults.should_drop() {
            debug!(len = raw.len(), "dropping request");
            return Ok(Outcome::Dropped);
        }

        let request = decode_frame(raw)?;
        let response = exchange(&self.device, &request);
        let mut packet = response.to_bytes()?;

        let corrupted = faults.maybe_corrupt(&mut packet);
        if corrupted {
            debug!(msg_type = response.msg_type, "corrupted response");
        }

        Ok(Outcome::Reply {
            packet,
            delay: faults.delay(),
            corrupted,
        })
    }
}
