use std::time::Duration;

use devsim_frame::MIN_PACKET_SIZE;
use serde::Serialize;

use crate::error::FaultConfigError;
use crate::random::RandomSource;

/// Upper bound for injected response delay.
pub const MAX_DELAY_MS: u64 = 5000;

/// Byte flipped by corruption: the message type, inside the header.
///
/// The length field stays intact, so receivers still read the right number of
/// bytes and only the checksum comparison fails.
pub const CORRUPT_OFFSET: usize = 3;

/// XOR mask applied at [`CORRUPT_OFFSET`].
pub const CORRUPT_MASK: u8 = 0xFF;

/// Network fault settings shared by every transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FaultConfig {
    delay_ms: u64,
    drop_rate: f64,
    corrupt_rate: f64,
}

impl FaultConfig {
    /// Validated fault settings: `delay_ms <= 5000`, rates within `0.0..=1.0`.
    pub fn new(delay_ms: u64, drop_rate: f64, corrupt_rate: f64) -> Result<Self, FaultConfigError> {
        if delay_ms > MAX_DELAY_MS {
            return Err(FaultConfigError::DelayOutOfRange {
                delay_ms,
                max: MAX_DELAY_MS,
            });
        }
        check_rate("drop_rate", drop_rate)?;
        check_rate("corrupt_rate", corrupt_rate)?;
        Ok(Self {
            delay_ms,
            drop_rate,
            corrupt_rate,
        })
    }

    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn drop_rate(&self) -> f64 {
        self.drop_rate
    }

    pub fn corrupt_rate(&self) -> f64 {
        self.corrupt_rate
    }

    /// The response delay, if any.
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }

    /// True when any fault can fire.
    pub fn is_active(&self) -> bool {
        self.delay_ms > 0 || self.drop_rate > 0.0 || self.corrupt_rate > 0.0
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), FaultConfigError> {
    // NaN fails the range check too.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FaultConfigError::RateOutOfRange { name, value })
    }
}

/// Per-request fault decisions for one snapshot of [`FaultConfig`].
///
/// Each check takes its own draw from the random source; a zero rate takes
/// no draw at all.
#[derive(Debug, Clone)]
pub struct FaultPipeline<R> {
    config: FaultConfig,
    rng: R,
}

impl<R: RandomSource> FaultPipeline<R> {
    pub fn new(config: FaultConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    /// Drop-on-receive: checked once per request, before any decoding.
    pub fn should_drop(&mut self) -> bool {
        roll(&mut self.rng, self.config.drop_rate)
    }

    /// Corrupt-on-send: checked once per request, after the response is encoded.
    pub fn should_corrupt(&mut self) -> bool {
        roll(&mut self.rng, self.config.corrupt_rate)
    }

    /// Run the corrupt check and flip the header byte when it fires.
    ///
    /// Returns true when the packet was altered.
    pub fn maybe_corrupt(&mut self, packet: &mut [u8]) -> bool {
        self.should_corrupt() && corrupt(packet)
    }

    /// Delay to wait before transmitting the response.
    pub fn delay(&self) -> Option<Duration> {
        self.config.delay()
    }
}

fn roll<R: RandomSource>(rng: &mut R, rate: f64) -> bool {
    rate > 0.0 && rng.next_f64() < rate
}

/// Flip one header byte of an encoded packet.
///
/// Packets of [`MIN_PACKET_SIZE`] bytes or fewer are left untouched.
pub fn corrupt(packet: &mut [u8]) -> bool {
    if packet.len() <= MIN_PACKET_SIZE {
        return false;
    }
    packet[CORRUPT_OFFSET] ^= CORRUPT_MASK;
    true
}
