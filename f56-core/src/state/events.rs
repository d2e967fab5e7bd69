//! Inputs that drive the engine, and the faults it handles internally

use f56_protocol::LinkEvent;

/// Handle for one arming of the deadline
///
/// Each time a reply-expecting state is entered the engine arms a fresh
/// token. A timeout is honored only for the token currently armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeadlineToken(pub(crate) u32);

/// Everything the engine can be asked to process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input<'a> {
    /// Translated wire event
    Link(LinkEvent),
    /// Deadline expiry
    Timeout(DeadlineToken),
    /// Application request to transmit a frame
    Send(&'a [u8]),
}

/// Link faults
///
/// These never leave the engine as values; they select transitions and are
/// logged and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Transport reported a receive error
    LineError,
    /// No reply within the deadline
    Timeout,
    /// Received checksum does not match the frame
    ChecksumMismatch,
    /// Event not handled by the current state
    UnexpectedEvent,
    /// Length field exceeds the receive buffer
    LengthOverflow,
    /// Peer answered a frame with NAK
    Rejected,
}

impl Fault {
    /// Fault carried by a link event, if it is one
    pub fn from_event(event: LinkEvent) -> Option<Self> {
        match event {
            LinkEvent::LineError => Some(Fault::LineError),
            _ => None,
        }
    }
}

impl<'a> From<LinkEvent> for Input<'a> {
    fn from(event: LinkEvent) -> Self {
        Input::Link(event)
    }
}
