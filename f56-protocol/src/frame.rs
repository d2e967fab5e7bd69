//! Frame encoding for the F56 link
//!
//! Frame format:
//! - DLE STX (2 bytes): frame start
//! - LENGTH (2 bytes): payload length, big-endian
//! - PAYLOAD (LENGTH bytes): opaque application data
//! - DLE ETX (2 bytes): frame end
//! - CRC (2 bytes): checksum over LENGTH, PAYLOAD and DLE ETX, little-endian

use heapless::Vec;

use crate::checksum::Checksum;
use crate::codes::{DLE_ETX, DLE_STX};

/// Maximum payload size in bytes
///
/// The length field could announce up to 65535 bytes. Frames announcing more
/// than this are not buffered: the receiver NAKs them as soon as the length
/// is read, so a peer that insists on a longer frame is never accepted.
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Bytes a frame adds around its payload
pub const FRAME_OVERHEAD: usize = 2 + 2 + 2 + 2;

/// Maximum complete frame size (DLE STX + LENGTH + MAX_PAYLOAD + DLE ETX + CRC)
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Size of the checksummed region for the largest payload
const MAX_CHECKED_SIZE: usize = 2 + MAX_PAYLOAD_SIZE + 2;

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Checksum of a frame with the given length prefix and payload
///
/// Covers `LEN_HI LEN_LO <payload> DLE ETX`, the region the receiver
/// recomputes before acknowledging.
pub fn frame_checksum<C: Checksum>(
    checksum: &C,
    length: [u8; 2],
    payload: &[u8],
) -> Result<u16, FrameError> {
    let mut region = Vec::<u8, MAX_CHECKED_SIZE>::new();
    region
        .extend_from_slice(&length)
        .map_err(|_| FrameError::PayloadTooLarge)?;
    region
        .extend_from_slice(payload)
        .map_err(|_| FrameError::PayloadTooLarge)?;
    region
        .extend_from_slice(&DLE_ETX)
        .map_err(|_| FrameError::PayloadTooLarge)?;
    Ok(checksum.compute(&region))
}

/// Encode `payload` as a complete wire frame into `buffer`
///
/// Returns the number of bytes written
pub fn encode<C: Checksum>(
    checksum: &C,
    payload: &[u8],
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let frame_len = payload.len() + FRAME_OVERHEAD;
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    let length = (payload.len() as u16).to_be_bytes();
    let crc = frame_checksum(checksum, length, payload)?.to_le_bytes();
    let end = 4 + payload.len();

    buffer[0..2].copy_from_slice(&DLE_STX);
    buffer[2..4].copy_from_slice(&length);
    buffer[4..end].copy_from_slice(payload);
    buffer[end..end + 2].copy_from_slice(&DLE_ETX);
    buffer[end + 2..end + 4].copy_from_slice(&crc);

    Ok(frame_len)
}

/// Encode `payload` as a complete wire frame into a heapless Vec
pub fn encode_to_vec<C: Checksum>(
    checksum: &C,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = encode(checksum, payload, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(vec)
}
