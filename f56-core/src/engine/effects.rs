//! Externally observable engine output

use heapless::Vec;

use f56_protocol::{MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};

/// Most effects a single input can produce
pub const MAX_EFFECTS: usize = 4;

/// Outcome of one initiator cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionStatus {
    /// Peer acknowledged the frame
    TransmissionComplete,
    /// Retry budget exhausted
    TransmissionFailure,
}

/// One thing the engine asks its driver to do
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Write these bytes to the wire
    Send(Vec<u8, MAX_FRAME_SIZE>),
    /// A validated inbound payload
    Frame(Vec<u8, MAX_PAYLOAD_SIZE>),
    /// Result of the current transmission
    Status(TransmissionStatus),
}

/// Effects produced by one input, in emission order
pub type Effects = Vec<Effect, MAX_EFFECTS>;

impl Effect {
    /// Send a two-byte control sequence
    pub fn control(sequence: [u8; 2]) -> Self {
        let mut bytes = Vec::new();
        // Cannot fail: two bytes always fit
        let _ = bytes.extend_from_slice(&sequence);
        Effect::Send(bytes)
    }

    /// Bytes to write, if this is a send effect
    pub fn as_send(&self) -> Option<&[u8]> {
        match self {
            Effect::Send(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Link counters
///
/// Monotonic, for diagnostics only; they never influence transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    /// Inbound frames accepted
    pub frames_received: u32,
    /// Inbound frames rejected for a bad checksum
    pub checksum_failures: u32,
    /// Negative acknowledges sent
    pub naks_sent: u32,
    /// Responder cycles abandoned without a NAK
    pub aborts: u32,
    /// Transmissions acknowledged by the peer
    pub transmissions_completed: u32,
    /// Transmissions that ran out of retries
    pub transmissions_failed: u32,
    /// Initiator attempts restarted after a fault
    pub retries: u32,
    /// Timeouts received for a deadline no longer armed
    pub stale_timeouts: u32,
}
