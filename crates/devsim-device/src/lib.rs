//! The simulated device.
//!
//! Holds the single shared device model (state, reset counter, fault
//! settings), the state machine that guards its transitions, and the fault
//! pipeline that decides per request whether to drop, corrupt or delay.
//!
//! [`Device`] is the handle every transport and the control surface share;
//! all access to the model goes through its lock.

pub mod device;
pub mod error;
pub mod faults;
pub mod model;
pub mod random;
pub mod state;

pub use device::{Device, Status};
pub use error::{ControlError, FaultConfigError, Result};
pub use faults::{FaultConfig, FaultPipeline, CORRUPT_MASK, CORRUPT_OFFSET, MAX_DELAY_MS};
pub use model::SimModel;
pub use random::{RandomSource, SeededRandom, SequenceRandom, SharedRandom, ThreadRandom};
pub use state::{DeviceState, InvalidTransition, Transition};
