use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use crate::error::{Result, TransportError};

/// Default host both servers bind to.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default datagram (UDP) port.
pub const DEFAULT_DATAGRAM_PORT: u16 = 9000;
/// Default stream (TCP) port.
pub const DEFAULT_STREAM_PORT: u16 = 9001;

/// A host/port pair naming one network surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Default datagram endpoint (`127.0.0.1:9000`).
    pub fn default_datagram() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_DATAGRAM_PORT)
    }

    /// Default stream endpoint (`127.0.0.1:9001`).
    pub fn default_stream() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_STREAM_PORT)
    }

    /// Resolve to the first socket address the host maps to.
    pub fn resolve(&self) -> Result<SocketAddr> {
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| TransportError::Resolve {
                endpoint: self.to_string(),
                reason: err.to_string(),
            })?;
        addrs.next().ok_or_else(|| TransportError::Resolve {
            endpoint: self.to_string(),
            reason: "no addresses found".to_string(),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: &str| TransportError::Resolve {
            endpoint: input.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = input
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected HOST:PORT"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid("host must not be empty"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
        Ok(Self::new(host, port))
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let ep: Endpoint = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(ep, Endpoint::default_datagram());
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let ep: Endpoint = "[::1]:9001".parse().unwrap();
        assert_eq!(ep.host, "::1");
        assert_eq!(ep.port, 9001);
        assert_eq!(ep.to_string(), "[::1]:9001");
    }

    #[test]
    fn rejects_missing_port() {
        assert!("localhost".parse::<Endpoint>().is_err());
        assert!("localhost:notaport".parse::<Endpoint>().is_err());
        assert!(":9000".parse::<Endpoint>().is_err());
    }

    #[test]
    fn resolves_loopback() {
        let addr = Endpoint::default_stream().resolve().unwrap();
        assert_eq!(addr.port(), DEFAULT_STREAM_PORT);
        assert!(addr.ip().is_loopback());
    }
}
