//! Frame integrity checksum

/// 16-bit checksum service consumed by the engine
///
/// Implementations must be pure: the same bytes always give the same code.
pub trait Checksum {
    /// Compute the checksum over `bytes`
    fn compute(&self, bytes: &[u8]) -> u16;
}

/// CRC-16/CCITT in its reflected ("Kermit") form
///
/// Polynomial 0x1021 processed LSB-first, initial value 0, no final XOR.
/// This is the code the F56 and ID-003 peripherals put after each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc16;

/// Reflected form of 0x1021
const POLY: u16 = 0x8408;

impl Checksum for Crc16 {
    fn compute(&self, bytes: &[u8]) -> u16 {
        crc16_update(0, bytes)
    }
}

fn crc16_update(crc: u16, data: &[u8]) -> u16 {
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
