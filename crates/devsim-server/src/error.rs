/// Errors that stop a server.
///
/// Per-request failures never surface here; they are logged and the
/// exchange is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Socket-level error.
    #[error("transport error: {0}")]
    Transport(#[from] devsim_transport::TransportError),

    /// I/O error on an already bound socket.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
