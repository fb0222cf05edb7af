use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: magic (2) + version (1) + type (1) + length (2) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Trailing CRC-32 size.
pub const CHECKSUM_SIZE: usize = 4;

/// Smallest valid packet: header plus checksum with an empty payload.
pub const MIN_PACKET_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Magic bytes: "QA" (0x51 0x41).
pub const MAGIC: [u8; 2] = *b"QA";

/// Protocol version carried in every header.
pub const VERSION: u8 = 1;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type code (see [`crate::msgtype`]).
    pub msg_type: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(msg_type: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            msg_type,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        MIN_PACKET_SIZE + self.payload.len()
    }

    /// Encode this frame into a fresh buffer.
    pub fn to_bytes(&self) -> Result<BytesMut> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.msg_type, &self.payload, &mut dst)?;
        Ok(dst)
    }

    /// The payload as UTF-8 text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// CRC-32 (IEEE) over `data`.
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬─────────┬──────────┬────────────┬─────────────┬──────────────┐
/// │ Magic (2) │ Ver (1) │ Type (1) │ Length     │ Payload     │ CRC-32       │
/// │ "QA"      │ 0x01    │          │ (2B BE)    │ (Length B)  │ (4B BE)      │
/// └───────────┴─────────┴──────────┴────────────┴─────────────┴──────────────┘
/// ```
///
/// The checksum covers the header and payload, never itself.
pub fn encode_frame(msg_type: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::InvalidArgument(format!(
            "payload too large ({} bytes, max {MAX_PAYLOAD})",
            payload.len()
        )));
    }

    let start = dst.len();
    dst.reserve(MIN_PACKET_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u8(VERSION);
    dst.put_u8(msg_type);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    let crc = checksum(&dst[start..]);
    dst.put_u32(crc);
    Ok(())
}

/// Decode one complete packet.
///
/// The declared payload length decides where the payload ends and where the
/// checksum sits; bytes after the checksum are ignored. The message type is
/// not validated.
pub fn decode_frame(packet: &[u8]) -> Result<Frame> {
    if packet.len() < MIN_PACKET_SIZE {
        return Err(FrameError::TooShort {
            len: packet.len(),
            needed: MIN_PACKET_SIZE,
        });
    }

    if packet[0..2] != MAGIC {
        return Err(FrameError::BadMagic {
            found: [packet[0], packet[1]],
        });
    }

    if packet[2] != VERSION {
        return Err(FrameError::UnsupportedVersion(packet[2]));
    }

    let msg_type = packet[3];
    let payload_len = u16::from_be_bytes([packet[4], packet[5]]) as usize;
    let body_end = HEADER_SIZE + payload_len;
    let needed = body_end + CHECKSUM_SIZE;
    if packet.len() < needed {
        return Err(FrameError::TooShort {
            len: packet.len(),
            needed,
        });
    }

    let received = u32::from_be_bytes([
        packet[body_end],
        packet[body_end + 1],
        packet[body_end + 2],
        packet[body_end + 3],
    ]);
    let computed = checksum(&packet[..body_end]);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    Ok(Frame {
        msg_type,
        payload: Bytes::copy_from_slice(&packet[HEADER_SIZE..body_end]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgtype::{REQ_PING, RESP_STATE};

    fn encode(msg_type: u8, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_frame(msg_type, payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload = b"CONFIGURED";
        let buf = encode(RESP_STATE, payload);

        assert_eq!(buf.len(), MIN_PACKET_SIZE + payload.len());

        let frame = decode_frame(&buf).unwrap();
        assert_eq!(frame.msg_type, RESP_STATE);
        assert_eq!(frame.payload.as_ref(), payload);
    }

    #[test]
    fn test_wire_layout_is_exact() {
        let buf = encode(REQ_PING, b"hi");
        assert_eq!(&buf[..6], &[0x51, 0x41, 0x01, 0x01, 0x00, 0x02]);
        assert_eq!(&buf[6..8], b"hi");
        let crc = checksum(&buf[..8]);
        assert_eq!(&buf[8..], &crc.to_be_bytes());
    }

    #[test]
    fn test_known_checksum_vector() {
        // zlib.crc32(b"123456789")
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_empty_payload() {
        let buf = encode(0, b"");
        assert_eq!(buf.len(), MIN_PACKET_SIZE);

        let frame = decode_frame(&buf).unwrap();
        assert_eq!(frame.msg_type, 0);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_max_payload_roundtrip() {
        let payload = vec![0xA5; MAX_PAYLOAD];
        let buf = encode(255, &payload);
        assert_eq!(buf.len(), MIN_PACKET_SIZE + MAX_PAYLOAD);

        let frame = decode_frame(&buf).unwrap();
        assert_eq!(frame.msg_type, 255);
        assert_eq!(frame.payload.len(), MAX_PAYLOAD);
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        let result = encode_frame(1, &payload, &mut buf);
        assert!(matches!(result, Err(FrameError::InvalidArgument(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_too_short() {
        let result = decode_frame(&[0x51, 0x41, 0x01, 0x01, 0x00]);
        assert!(matches!(result, Err(FrameError::TooShort { len: 5, .. })));
    }

    #[test]
    fn test_decode_declared_length_exceeds_packet() {
        let mut buf = encode(1, b"hello");
        buf.truncate(buf.len() - 1);
        let result = decode_frame(&buf);
        assert!(matches!(result, Err(FrameError::TooShort { needed: 15, .. })));
    }

    #[test]
    fn test_decode_bad_magic() {
        let mut buf = encode(1, b"");
        buf[0] = b'X';
        let result = decode_frame(&buf);
        assert!(matches!(
            result,
            Err(FrameError::BadMagic { found }) if found == [b'X', b'A']
        ));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let mut buf = encode(1, b"");
        buf[2] = 2;
        let result = decode_frame(&buf);
        assert!(matches!(result, Err(FrameError::UnsupportedVersion(2))));
    }

    #[test]
    fn test_decode_ignores_unknown_type() {
        let buf = encode(77, b"??");
        let frame = decode_frame(&buf).unwrap();
        assert_eq!(frame.msg_type, 77);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut buf = encode(2, b"x");
        buf.extend_from_slice(b"junk");
        let frame = decode_frame(&buf).unwrap();
        assert_eq!(frame.payload.as_ref(), b"x");
    }

    #[test]
    fn test_single_byte_flip_is_always_rejected() {
        let clean = encode(RESP_STATE, b"STREAMING");
        for offset in 0..clean.len() {
            let mut damaged = clean.clone();
            damaged[offset] ^= 0xFF;
            let result = decode_frame(&damaged);
            assert!(result.is_err(), "flip at {offset} went undetected");

            // Type, payload and checksum bytes can only be caught by the CRC.
            if offset == 3 || offset >= HEADER_SIZE {
                assert!(
                    matches!(result, Err(FrameError::ChecksumMismatch { .. })),
                    "flip at {offset} gave {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_frame_helpers() {
        let frame = Frame::new(RESP_STATE, Bytes::from_static(b"IDLE"));
        assert_eq!(frame.wire_size(), MIN_PACKET_SIZE + 4);
        assert_eq!(frame.payload_str(), Some("IDLE"));

        let wire = frame.to_bytes().unwrap();
        assert_eq!(decode_frame(&wire).unwrap(), frame);
    }
}
