use std::net::SocketAddr;

/// Errors that can occur in socket operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// The endpoint string could not be resolved to a socket address.
    #[error("failed to resolve endpoint {endpoint}: {reason}")]
    Resolve { endpoint: String, reason: String },

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error, if this error wraps one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => {
                Some(source)
            }
            TransportError::Accept(err) | TransportError::Io(err) => Some(err),
            TransportError::Resolve { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn io_source_exposes_wrapped_error() {
        let err = TransportError::Connect {
            addr: "127.0.0.1:9001".parse().unwrap(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        let source = err.io_source().expect("connect errors wrap io");
        assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);

        let err = TransportError::Io(io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(err.io_source().map(io::Error::kind), Some(io::ErrorKind::TimedOut));
    }

    #[test]
    fn resolve_has_no_io_source() {
        let err = TransportError::Resolve {
            endpoint: "nowhere".into(),
            reason: "expected HOST:PORT".into(),
        };
        assert!(err.io_source().is_none());
    }
}
