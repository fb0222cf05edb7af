//! Message type codes.
//!
//! Requests occupy 1-4, responses 101-103. Any other code arriving as a
//! request is answered with `RESP_ERR` / `UNKNOWN_REQ`.

/// Liveness probe; answered with `RESP_OK` / `PONG`.
pub const REQ_PING: u8 = 1;

/// Current device state; answered with `RESP_STATE` / state name.
pub const REQ_STATUS: u8 = 2;

/// Start streaming (CONFIGURED -> STREAMING).
pub const REQ_START: u8 = 3;

/// Stop streaming (STREAMING -> CONFIGURED).
pub const REQ_STOP: u8 = 4;

/// Request succeeded.
pub const RESP_OK: u8 = 101;

/// Request rejected.
pub const RESP_ERR: u8 = 102;

/// Device state report.
pub const RESP_STATE: u8 = 103;

/// The closed set of request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    Ping,
    Status,
    Start,
    Stop,
}

impl Request {
    /// Map a wire message type to a request kind.
    pub fn from_msg_type(msg_type: u8) -> Option<Self> {
        match msg_type {
            REQ_PING => Some(Request::Ping),
            REQ_STATUS => Some(Request::Status),
            REQ_START => Some(Request::Start),
            REQ_STOP => Some(Request::Stop),
            _ => None,
        }
    }

    /// The wire message type for this request.
    pub fn msg_type(self) -> u8 {
        match self {
            Request::Ping => REQ_PING,
            Request::Status => REQ_STATUS,
            Request::Start => REQ_START,
            Request::Stop => REQ_STOP,
        }
    }
}

/// Returns a human-readable name for a message type.
pub fn type_name(msg_type: u8) -> &'static str {
    match msg_type {
        REQ_PING => "PING",
        REQ_STATUS => "STATUS",
        REQ_START => "START",
        REQ_STOP => "STOP",
        RESP_OK => "OK",
        RESP_ERR => "ERR",
        RESP_STATE => "STATE",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_codes_map_both_ways() {
        for req in [Request::Ping, Request::Status, Request::Start, Request::Stop] {
            assert_eq!(Request::from_msg_type(req.msg_type()), Some(req));
        }
    }

    #[test]
    fn response_codes_are_not_requests() {
        assert_eq!(Request::from_msg_type(RESP_OK), None);
        assert_eq!(Request::from_msg_type(0), None);
        assert_eq!(Request::from_msg_type(255), None);
    }

    #[test]
    fn names() {
        assert_eq!(type_name(RESP_STATE), "STATE");
        assert_eq!(type_name(42), "UNKNOWN");
    }
}
