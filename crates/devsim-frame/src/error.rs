/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The packet is shorter than the header, checksum and declared payload require.
    #[error("packet too short ({len} bytes, need {needed})")]
    TooShort { len: usize, needed: usize },

    /// The frame header contains an invalid magic number.
    #[error("bad frame magic {found:02x?} (expected \"QA\")")]
    BadMagic { found: [u8; 2] },

    /// The frame header carries a protocol version this codec does not speak.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    /// The trailing CRC-32 does not match the header and payload.
    #[error("checksum mismatch (received {received:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { received: u32, computed: u32 },

    /// Encode input that cannot be represented on the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An I/O error occurred while reading a packet from a stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete packet was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for wire-level validation failures (as opposed to I/O or usage errors).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::TooShort { .. }
                | FrameError::BadMagic { .. }
                | FrameError::UnsupportedVersion(_)
                | FrameError::ChecksumMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
