use crate::state::InvalidTransition;

/// Fault settings rejected by validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FaultConfigError {
    #[error("delay_ms {delay_ms} out of range (max {max})")]
    DelayOutOfRange { delay_ms: u64, max: u64 },

    #[error("{name} {value} out of range (expected 0.0..=1.0)")]
    RateOutOfRange { name: &'static str, value: f64 },
}

/// Errors surfaced by control-surface operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    /// The requested transition is not legal from the current state.
    #[error("conflict: {0}")]
    Conflict(#[from] InvalidTransition),

    /// The fault settings failed validation.
    #[error("invalid fault settings: {0}")]
    InvalidFaults(#[from] FaultConfigError),
}

pub type Result<T> = std::result::Result<T, ControlError>;
