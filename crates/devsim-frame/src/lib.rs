//! Checksummed binary framing for the device simulator protocol.
//!
//! Every message is framed with:
//! - A 2-byte magic number ("QA")
//! - A 1-byte protocol version
//! - A 1-byte message type
//! - A 2-byte big-endian payload length
//! - A 4-byte big-endian CRC-32 trailer over everything before it
//!
//! The codec is pure; [`reader`] adds length-driven packet discovery for
//! byte-oriented streams.

pub mod codec;
pub mod error;
pub mod msgtype;
pub mod reader;

pub use codec::{
    checksum, decode_frame, encode_frame, Frame, CHECKSUM_SIZE, HEADER_SIZE, MAGIC, MAX_PAYLOAD,
    MIN_PACKET_SIZE, VERSION,
};
pub use error::{FrameError, Result};
pub use msgtype::{
    type_name, Request, REQ_PING, REQ_START, REQ_STATUS, REQ_STOP, RESP_ERR, RESP_OK, RESP_STATE,
};
pub use reader::{read_frame, read_packet};
