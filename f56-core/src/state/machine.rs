//! State definitions
//!
//! Every engine behavior is a function of the current state and an event.
//! The transition logic itself lives in [`crate::engine`], which owns the
//! buffers and counters the transitions act on.

use f56_protocol::RxMode;

/// Engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Line free, nothing in progress
    Idle,

    // Responder: peer-initiated frame
    /// Peer sent DLE, waiting for ENQ to complete the bid
    BidWait,
    /// Bid acknowledged, waiting for the frame-start DLE
    FrameSync,
    /// Got DLE, waiting for STX
    FrameStart,
    /// Collecting the two length bytes
    LengthField,
    /// Collecting payload bytes up to the parsed length
    Payload,
    /// Payload complete, waiting for the closing DLE
    FrameEndEscape,
    /// Got closing DLE, waiting for ETX
    FrameEnd,
    /// Collecting the two checksum bytes
    Checksum,
    /// Verifying the received frame (entry-only)
    ChecksumCheck,

    // Initiator: locally queued frame
    /// Sending the line bid (entry-only)
    BidSend,
    /// Bid sent, waiting for the DLE of the peer answer
    BidAckWait,
    /// Got DLE, waiting for ACK
    BidAck,
    /// Sending the queued frame (entry-only)
    Transmit,
    /// Frame sent, waiting for the DLE of the peer answer
    FrameAckWait,
    /// Got DLE, waiting for ACK or NAK
    FrameAck,
}

/// Which side of the link drives the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Receiving a frame the peer initiated
    Responder,
    /// Driving a locally queued frame
    Initiator,
}

impl State {
    /// Check if a deadline is armed while in this state
    pub fn expects_reply(&self) -> bool {
        !matches!(
            self,
            State::Idle | State::ChecksumCheck | State::BidSend | State::Transmit
        )
    }

    /// Check if this state runs its action on entry and leaves immediately
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            State::ChecksumCheck | State::BidSend | State::Transmit
        )
    }

    /// Role this state belongs to, `None` for Idle
    pub fn role(&self) -> Option<Role> {
        match self {
            State::Idle => None,
            State::BidWait
            | State::FrameSync
            | State::FrameStart
            | State::LengthField
            | State::Payload
            | State::FrameEndEscape
            | State::FrameEnd
            | State::Checksum
            | State::ChecksumCheck => Some(Role::Responder),
            State::BidSend
            | State::BidAckWait
            | State::BidAck
            | State::Transmit
            | State::FrameAckWait
            | State::FrameAck => Some(Role::Initiator),
        }
    }

    /// How the translator should read the next byte in this state
    pub fn rx_mode(&self) -> RxMode {
        match self {
            State::Idle => RxMode::Idle,
            State::LengthField | State::Payload | State::Checksum => RxMode::Collecting,
            State::FrameEndEscape | State::FrameEnd => RxMode::FrameEnd,
            _ => RxMode::Control,
        }
    }
}
