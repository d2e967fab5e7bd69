//! Inbound frame assembly
//!
//! Holds the length prefix, payload and checksum bytes of the frame being
//! received. Only meaningful while the engine is on the responder path.

use heapless::Vec;

use f56_protocol::frame::frame_checksum;
use f56_protocol::{Checksum, MAX_PAYLOAD_SIZE};

/// Buffers for one inbound frame
#[derive(Debug, Clone, Default)]
pub struct InboundAssembly {
    length: Vec<u8, 2>,
    data: Vec<u8, MAX_PAYLOAD_SIZE>,
    checksum: Vec<u8, 2>,
}

impl InboundAssembly {
    /// Create an empty assembly
    pub const fn new() -> Self {
        Self {
            length: Vec::new(),
            data: Vec::new(),
            checksum: Vec::new(),
        }
    }

    /// Discard everything collected so far
    pub fn reset(&mut self) {
        self.length.clear();
        self.data.clear();
        self.checksum.clear();
    }

    /// Append a length byte
    ///
    /// Returns the parsed length once both bytes are present.
    pub fn push_length(&mut self, byte: u8) -> Option<usize> {
        // Only called from LengthField, which is left on the second byte
        let pushed = self.length.push(byte);
        debug_assert!(pushed.is_ok(), "length field overflow");
        self.parsed_length()
    }

    /// Payload length announced by the peer, once both bytes are in
    pub fn parsed_length(&self) -> Option<usize> {
        match self.length.as_slice() {
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo]) as usize),
            _ => None,
        }
    }

    /// Append a payload byte
    ///
    /// Returns true once the payload has reached the parsed length. Bytes
    /// beyond the parsed length are dropped.
    pub fn push_data(&mut self, byte: u8) -> bool {
        let Some(expected) = self.parsed_length() else {
            return false;
        };
        if self.data.len() < expected {
            // Cannot fail: expected was checked against capacity when parsed
            let _ = self.data.push(byte);
        }
        self.data.len() >= expected
    }

    /// Append a checksum byte
    ///
    /// Returns true once both checksum bytes are present.
    pub fn push_checksum(&mut self, byte: u8) -> bool {
        // Only called from Checksum, which is left on the second byte
        let pushed = self.checksum.push(byte);
        debug_assert!(pushed.is_ok(), "checksum field overflow");
        self.checksum.is_full()
    }

    /// Payload collected so far
    pub fn payload(&self) -> &Vec<u8, MAX_PAYLOAD_SIZE> {
        &self.data
    }

    /// Checksum sent by the peer, read little-endian
    pub fn received_checksum(&self) -> Option<u16> {
        match self.checksum.as_slice() {
            [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }

    /// Checksum recomputed over length, payload and the frame end sequence
    pub fn computed_checksum<C: Checksum>(&self, checksum: &C) -> Option<u16> {
        let length: [u8; 2] = self.length.as_slice().try_into().ok()?;
        frame_checksum(checksum, length, &self.data).ok()
    }

    /// Check the received checksum against the recomputed one
    pub fn is_valid<C: Checksum>(&self, checksum: &C) -> bool {
        match (self.computed_checksum(checksum), self.received_checksum()) {
            (Some(computed), Some(received)) => computed == received,
            _ => false,
        }
    }
}
