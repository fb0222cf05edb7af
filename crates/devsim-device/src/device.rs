use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::faults::{FaultConfig, FaultPipeline};
use crate::model::SimModel;
use crate::random::{RandomSource, SharedRandom};
use crate::state::DeviceState;

/// Snapshot returned by the control surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub state: DeviceState,
    pub reset_count: u64,
    pub faults: FaultConfig,
}

/// Shared handle to the single simulated device.
///
/// Clones share one model and one random source. Every read and write of the
/// model is serialized through one lock, so two concurrent START requests
/// cannot both observe CONFIGURED.
#[derive(Clone, Default)]
pub struct Device {
    model: Arc<Mutex<SimModel>>,
    random: SharedRandom,
}

impl Device {
    /// A fresh device drawing fault decisions from the thread RNG.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh device drawing fault decisions from `source`.
    pub fn with_random(source: impl RandomSource + Send + 'static) -> Self {
        Self {
            model: Arc::default(),
            random: SharedRandom::new(source),
        }
    }

    /// Run `f` with exclusive access to the model.
    pub fn transact<T>(&self, f: impl FnOnce(&mut SimModel) -> T) -> T {
        f(&mut self.lock())
    }

    /// Fault decisions for one request, from the current settings.
    pub fn fault_pipeline(&self) -> FaultPipeline<SharedRandom> {
        FaultPipeline::new(self.faults(), self.random.clone())
    }

    /// Force IDLE and bump the reset counter. Fault settings are kept.
    pub fn reset(&self) -> Status {
        let mut model = self.lock();
        model.reset();
        info!(reset_count = model.reset_count(), "device reset");
        status_of(&model)
    }

    /// IDLE -> CONFIGURED.
    pub fn configure(&self) -> Result<DeviceState> {
        let state = self.lock().configure()?;
        info!(%state, "device configured");
        Ok(state)
    }

    /// CONFIGURED -> STREAMING.
    pub fn start_stream(&self) -> Result<DeviceState> {
        let state = self.lock().start_stream()?;
        info!(%state, "stream started");
        Ok(state)
    }

    /// STREAMING -> CONFIGURED.
    pub fn stop_stream(&self) -> Result<DeviceState> {
        let state = self.lock().stop_stream()?;
        info!(%state, "stream stopped");
        Ok(state)
    }

    pub fn status(&self) -> Status {
        status_of(&self.lock())
    }

    /// Current state only.
    pub fn health(&self) -> DeviceState {
        self.lock().state()
    }

    pub fn faults(&self) -> FaultConfig {
        self.lock().faults()
    }

    /// Validate and replace the fault settings.
    pub fn set_faults(
        &self,
        delay_ms: u64,
        drop_rate: f64,
        corrupt_rate: f64,
    ) -> Result<FaultConfig> {
        let faults = FaultConfig::new(delay_ms, drop_rate, corrupt_rate)?;
        self.lock().set_faults(faults);
        if faults.is_active() {
            info!(delay_ms, drop_rate, corrupt_rate, "fault injection enabled");
        } else {
            debug!("fault injection disabled");
        }
        Ok(faults)
    }

    fn lock(&self) -> MutexGuard<'_, SimModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn status_of(model: &SimModel) -> Status {
    Status {
        state: model.state(),
        reset_count: model.reset_count(),
        faults: model.faults(),
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("model", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::error::{ControlError, FaultConfigError};
    use crate::random::SequenceRandom;
    use crate::state::{InvalidTransition, Transition};

    #[test]
    fn control_cycle() {
        let device = Device::new();
        assert_eq!(device.health(), DeviceState::Idle);
        assert_eq!(device.configure(), Ok(DeviceState::Configured));
        assert_eq!(device.start_stream(), Ok(DeviceState::Streaming));
        assert_eq!(device.stop_stream(), Ok(DeviceState::Configured));
    }

    #[test]
    fn invalid_transition_is_a_conflict() {
        let device = Device::new();
        let err = device.stop_stream().unwrap_err();
        assert_eq!(
            err,
            ControlError::Conflict(InvalidTransition {
                from: DeviceState::Idle,
                to: DeviceState::Configured,
            })
        );
        assert_eq!(device.health(), DeviceState::Idle);
    }

    #[test]
    fn reset_reports_status_and_keeps_faults() {
        let device = Device::new();
        device.set_faults(10, 0.2, 0.3).unwrap();
        device.configure().unwrap();

        let status = device.reset();
        assert_eq!(status.state, DeviceState::Idle);
        assert_eq!(status.reset_count, 1);
        assert_eq!(status.faults, FaultConfig::new(10, 0.2, 0.3).unwrap());
        assert_eq!(device.status(), status);
    }

    #[test]
    fn set_faults_rejects_out_of_range() {
        let device = Device::new();
        let err = device.set_faults(6000, 0.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            ControlError::InvalidFaults(FaultConfigError::DelayOutOfRange { .. })
        ));
        assert_eq!(device.faults(), FaultConfig::none());
    }

    #[test]
    fn status_serializes_with_state_names() {
        let device = Device::new();
        device.set_faults(5, 0.5, 0.0).unwrap();
        let json = serde_json::to_value(device.status()).unwrap();
        assert_eq!(json["state"], "IDLE");
        assert_eq!(json["reset_count"], 0);
        assert_eq!(json["faults"]["delay_ms"], 5);
        assert_eq!(json["faults"]["drop_rate"], 0.5);
    }

    #[test]
    fn clones_share_state_and_random_stream() {
        let device = Device::with_random(SequenceRandom::new([0.1, 0.9]));
        device.set_faults(0, 0.5, 0.0).unwrap();
        let other = device.clone();
        other.configure().unwrap();
        assert_eq!(device.health(), DeviceState::Configured);

        assert!(device.fault_pipeline().should_drop());
        assert!(!other.fault_pipeline().should_drop());
    }

    #[test]
    fn concurrent_starts_transition_once() {
        let device = Device::new();
        device.configure().unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let device = device.clone();
                thread::spawn(move || device.transact(|m| m.apply(Transition::Start).is_ok()))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(device.health(), DeviceState::Streaming);
    }
}
