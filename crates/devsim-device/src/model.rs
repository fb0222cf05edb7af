use crate::faults::FaultConfig;
use crate::state::{DeviceState, InvalidTransition, Transition};

/// The device model: current state, reset counter and fault settings.
///
/// State changes only through the transition methods. Faults survive
/// [`SimModel::reset`]; clearing them is a separate `set_faults` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimModel {
    state: DeviceState,
    reset_count: u64,
    faults: FaultConfig,
}

impl SimModel {
    /// A fresh model: IDLE, zero resets, no faults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }

    pub fn faults(&self) -> FaultConfig {
        self.faults
    }

    /// Force IDLE from any state and bump the reset counter.
    pub fn reset(&mut self) {
        self.state = DeviceState::Idle;
        self.reset_count += 1;
    }

    /// IDLE -> CONFIGURED.
    pub fn configure(&mut self) -> Result<DeviceState, InvalidTransition> {
        self.apply(Transition::Configure)
    }

    /// CONFIGURED -> STREAMING.
    pub fn start_stream(&mut self) -> Result<DeviceState, InvalidTransition> {
        self.apply(Transition::Start)
    }

    /// STREAMING -> CONFIGURED.
    pub fn stop_stream(&mut self) -> Result<DeviceState, InvalidTransition> {
        self.apply(Transition::Stop)
    }

    /// Apply a guarded transition; the state is unchanged on failure.
    pub fn apply(&mut self, transition: Transition) -> Result<DeviceState, InvalidTransition> {
        self.state = self.state.transition(transition)?;
        Ok(self.state)
    }

    /// Replace the fault settings (last writer wins).
    pub fn set_faults(&mut self, faults: FaultConfig) {
        self.faults = faults;
    }
}
