//! Link events delivered by the translator to the engine

/// Discrete protocol events derived from the received byte stream
///
/// Several variants share a wire byte: DLE is reported as `LineBidByte1`,
/// `FrameStartEscape` or `FrameEndEscape` depending on where the link is in
/// the frame. See [`crate::translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// DLE received while the line is idle (first byte of a peer bid)
    LineBidByte1,
    /// ENQ received (confirming bid byte)
    LineBidByte2,
    /// DLE received while waiting for a frame to start
    FrameStartEscape,
    /// STX received
    FrameStartMarker,
    /// Any byte received while collecting, or a non-control byte otherwise
    DataByte(u8),
    /// DLE received after the payload
    FrameEndEscape,
    /// ETX received
    FrameEndMarker,
    /// ACK received
    AckByte,
    /// NAK received
    NakByte,
    /// Transport fault (framing, parity or overrun error)
    LineError,
}

impl LinkEvent {
    /// Returns true for every DLE-derived event
    pub fn is_escape(&self) -> bool {
        matches!(
            self,
            LinkEvent::LineBidByte1 | LinkEvent::FrameStartEscape | LinkEvent::FrameEndEscape
        )
    }
}
