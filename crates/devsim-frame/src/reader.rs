use std::io::ErrorKind;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::codec::{decode_frame, Frame, CHECKSUM_SIZE, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Read exactly one packet from a byte stream.
///
/// Reads the fixed-size header first, takes the payload length from it, then
/// reads exactly `payload_length + CHECKSUM_SIZE` more bytes. Nothing beyond
/// the packet is consumed. Header fields other than the length are left for
/// [`decode_frame`] to validate.
///
/// Returns `Err(FrameError::ConnectionClosed)` if the peer disconnects before
/// the packet is complete.
pub async fn read_packet<R>(reader: &mut R) -> Result<BytesMut>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    read_exact_or_closed(reader, &mut header).await?;

    let payload_len = u16::from_be_bytes([header[4], header[5]]) as usize;
    let mut packet = BytesMut::zeroed(HEADER_SIZE + payload_len + CHECKSUM_SIZE);
    packet[..HEADER_SIZE].copy_from_slice(&header);
    read_exact_or_closed(reader, &mut packet[HEADER_SIZE..]).await?;

    trace!(payload_len, "read packet from stream");
    Ok(packet)
}

/// Read and decode exactly one frame from a byte stream.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let packet = read_packet(reader).await?;
    decode_frame(&packet)
}

async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(FrameError::ConnectionClosed),
        Err(err) => Err(FrameError::Io(err)),
    }
}
