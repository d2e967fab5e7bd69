//! Byte to event translation
//!
//! The same wire byte means different things depending on where the link is
//! in a frame. The engine reports an [`RxMode`] for its current state and the
//! translator maps each received byte accordingly.

use crate::codes::{ACK, DLE, ENQ, ETX, NAK, STX};
use crate::events::LinkEvent;

/// How the next received byte should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxMode {
    /// Line idle: DLE opens a peer bid
    Idle,
    /// Handshake or frame start: DLE is a frame-start escape
    Control,
    /// Collecting length, payload or checksum bytes: every byte is data
    Collecting,
    /// Payload complete: DLE is the frame-end escape
    FrameEnd,
}

/// Translate one received byte under `mode`
pub fn translate(byte: u8, mode: RxMode) -> LinkEvent {
    if mode == RxMode::Collecting {
        return LinkEvent::DataByte(byte);
    }

    match byte {
        DLE => match mode {
            RxMode::Idle => LinkEvent::LineBidByte1,
            RxMode::FrameEnd => LinkEvent::FrameEndEscape,
            RxMode::Control | RxMode::Collecting => LinkEvent::FrameStartEscape,
        },
        ENQ => LinkEvent::LineBidByte2,
        STX => LinkEvent::FrameStartMarker,
        ETX => LinkEvent::FrameEndMarker,
        ACK => LinkEvent::AckByte,
        NAK => LinkEvent::NakByte,
        other => LinkEvent::DataByte(other),
    }
}

/// Event reported for a receive-side transport fault
pub const fn line_error() -> LinkEvent {
    LinkEvent::LineError
}
