use std::time::Duration;

/// Errors a single request attempt can fail with.
///
/// Every variant counts as a failed attempt under [`crate::retry`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Socket-level error.
    #[error("transport error: {0}")]
    Transport(#[from] devsim_transport::TransportError),

    /// The reply could not be read or failed validation.
    #[error("frame error: {0}")]
    Frame(#[from] devsim_frame::FrameError),

    /// No reply arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
