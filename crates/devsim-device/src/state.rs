use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating state of the simulated device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    #[default]
    Idle,
    Configured,
    Streaming,
}

impl DeviceState {
    /// Textual name, as carried in `RESP_STATE` payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Idle => "IDLE",
            DeviceState::Configured => "CONFIGURED",
            DeviceState::Streaming => "STREAMING",
        }
    }

    /// Apply a guarded transition.
    ///
    /// Returns the target state, or the rejected `(current, target)` pair.
    pub fn transition(self, transition: Transition) -> Result<DeviceState, InvalidTransition> {
        if self == transition.source() {
            Ok(transition.target())
        } else {
            Err(InvalidTransition {
                from: self,
                to: transition.target(),
            })
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guarded transitions. `reset` is not listed: it is legal from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// IDLE -> CONFIGURED
    Configure,
    /// CONFIGURED -> STREAMING
    Start,
    /// STREAMING -> CONFIGURED
    Stop,
}

impl Transition {
    /// The only state this transition may start from.
    pub fn source(self) -> DeviceState {
        match self {
            Transition::Configure => DeviceState::Idle,
            Transition::Start => DeviceState::Configured,
            Transition::Stop => DeviceState::Streaming,
        }
    }

    /// The state this transition leads to.
    pub fn target(self) -> DeviceState {
        match self {
            Transition::Configure => DeviceState::Configured,
            Transition::Start => DeviceState::Streaming,
            Transition::Stop => DeviceState::Configured,
        }
    }
}

/// A transition attempted from a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: DeviceState,
    pub to: DeviceState,
}
