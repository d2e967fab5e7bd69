//! Application side of a link
//!
//! Caller-owned so several links can run side by side; declare one as a
//! `static` with `CriticalSectionRawMutex` on target, or on the stack with
//! `NoopRawMutex` when driver and application share an executor.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use f56_core::{SendError, TransmissionStatus};
use f56_protocol::{MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};

/// Queued transmissions waiting for the line
pub const REQUEST_CHANNEL_SIZE: usize = 4;

/// Frames and statuses waiting for the application
pub const OUTPUT_CHANNEL_SIZE: usize = 8;

/// Bytes queued for one transmission
pub type Request = Vec<u8, MAX_FRAME_SIZE>;

/// Something the link reports to the application
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkOutput {
    /// Payload of a frame received from the peer
    Frame(Vec<u8, MAX_PAYLOAD_SIZE>),
    /// Outcome of a queued transmission
    Status(TransmissionStatus),
}

/// Request and output queues for one link
pub struct LinkChannels<M: RawMutex> {
    pub(crate) requests: Channel<M, Request, REQUEST_CHANNEL_SIZE>,
    pub(crate) outputs: Channel<M, LinkOutput, OUTPUT_CHANNEL_SIZE>,
}

impl<M: RawMutex> LinkChannels<M> {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            outputs: Channel::new(),
        }
    }

    /// Queue `frame` for transmission, waiting for room
    ///
    /// The bytes go on the wire verbatim once the line is won.
    pub async fn send(&self, frame: &[u8]) -> Result<(), SendError> {
        let request = Self::request(frame)?;
        self.requests.send(request).await;
        Ok(())
    }

    /// Queue `frame` for transmission if there is room
    pub fn try_send(&self, frame: &[u8]) -> Result<(), SendError> {
        let request = Self::request(frame)?;
        self.requests.try_send(request).map_err(|_| SendError::Busy)
    }

    /// Wait for the next frame or status
    pub async fn receive(&self) -> LinkOutput {
        self.outputs.receive().await
    }

    /// Next frame or status, if one is waiting
    pub fn try_receive(&self) -> Option<LinkOutput> {
        self.outputs.try_receive().ok()
    }

    fn request(frame: &[u8]) -> Result<Request, SendError> {
        Vec::from_slice(frame).map_err(|_| SendError::PayloadTooLarge)
    }
}

impl<M: RawMutex> Default for LinkChannels<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_try_send_rejects_oversized_frame() {
        let channels = LinkChannels::<NoopRawMutex>::new();
        let big = [0u8; MAX_FRAME_SIZE + 1];
        assert_eq!(channels.try_send(&big), Err(SendError::PayloadTooLarge));
    }

    #[test]
    fn test_try_send_reports_full_queue() {
        let channels = LinkChannels::<NoopRawMutex>::new();
        for _ in 0..REQUEST_CHANNEL_SIZE {
            assert_eq!(channels.try_send(&[0x01]), Ok(()));
        }
        assert_eq!(channels.try_send(&[0x01]), Err(SendError::Busy));
    }

    #[test]
    fn test_empty_outputs() {
        let channels = LinkChannels::<NoopRawMutex>::new();
        assert_eq!(channels.try_receive(), None);
    }
}
