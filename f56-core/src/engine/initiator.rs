//! Initiator path: bidding for the line and transmitting the queued frame

use f56_protocol::codes::DLE_ENQ;
use f56_protocol::{Checksum, LinkEvent};

use super::{Effect, Effects, Engine, RetryDecision, Stimulus, TransmissionStatus};
use crate::state::{Fault, State};

/// Which retry budget a fault is charged to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    /// Waiting for the DLE of a peer answer
    Escape,
    /// Waiting for the ACK (or NAK) after the DLE
    Ack,
}

impl<C: Checksum> Engine<C> {
    pub(super) fn on_initiator(&mut self, stimulus: Stimulus, effects: &mut Effects) {
        use LinkEvent::*;
        use Stimulus::{Event, Fault as Failure};

        match (self.state, stimulus) {
            // BidAckWait: expect the DLE of the peer's bid answer
            (State::BidAckWait, Event(event)) if event.is_escape() => {
                self.transition(State::BidAck, effects)
            }
            (State::BidAckWait, Failure(fault)) => {
                self.retry(Counter::Escape, State::BidSend, fault, effects)
            }
            (State::BidAckWait, Event(event)) => trace!("BidAckWait: ignoring {:?}", event),

            // BidAck: expect ACK confirming the line is ours
            (State::BidAck, Event(LineBidByte2)) => {
                debug!("Bid collision, bidding again");
                self.transition(State::BidSend, effects);
            }
            (State::BidAck, Event(AckByte)) => {
                self.ack_retries.reset();
                self.transition(State::Transmit, effects);
            }
            (State::BidAck, Failure(fault)) => {
                self.retry(Counter::Ack, State::BidSend, fault, effects)
            }
            (State::BidAck, Event(_)) => self.transition(State::BidAckWait, effects),

            // FrameAckWait: expect the DLE of the peer's frame answer
            (State::FrameAckWait, Event(event)) if event.is_escape() => {
                self.transition(State::FrameAck, effects)
            }
            (State::FrameAckWait, Failure(fault)) => {
                self.retry(Counter::Escape, State::Transmit, fault, effects)
            }
            (State::FrameAckWait, Event(event)) => trace!("FrameAckWait: ignoring {:?}", event),

            // FrameAck: ACK, NAK, or the peer bidding over us
            (State::FrameAck, Event(LineBidByte2)) => {
                warn!("Peer bid during frame ack, transmission abandoned");
                self.transition(State::Idle, effects);
            }
            (State::FrameAck, Event(AckByte)) => {
                info!("Transmission complete");
                self.stats.transmissions_completed =
                    self.stats.transmissions_completed.saturating_add(1);
                self.emit(
                    Effect::Status(TransmissionStatus::TransmissionComplete),
                    effects,
                );
                self.transition(State::Idle, effects);
            }
            (State::FrameAck, Event(NakByte)) => {
                self.retry(Counter::Ack, State::Transmit, Fault::Rejected, effects)
            }
            (State::FrameAck, Failure(fault)) => {
                self.retry(Counter::Ack, State::Transmit, fault, effects)
            }
            (State::FrameAck, Event(_)) => self.transition(State::FrameAckWait, effects),

            // BidSend and Transmit are entry-only
            (state, stimulus) => trace!("{:?}: unhandled {:?}", state, stimulus),
        }
    }

    /// BidSend on-enter action
    pub(super) fn send_bid(&mut self, effects: &mut Effects) {
        self.emit(Effect::control(DLE_ENQ), effects);
        self.transition(State::BidAckWait, effects);
    }

    /// Transmit on-enter action
    pub(super) fn transmit(&mut self, effects: &mut Effects) {
        let Some(frame) = self.pending.clone() else {
            warn!("Transmit with nothing queued");
            self.transition(State::Idle, effects);
            return;
        };

        debug!("Transmitting {} bytes", frame.len());
        self.emit(Effect::Send(frame), effects);
        self.transition(State::FrameAckWait, effects);
    }

    /// Charge `fault` to a retry budget and restart at `restart`, or give up
    fn retry(&mut self, counter: Counter, restart: State, fault: Fault, effects: &mut Effects) {
        let decision = match counter {
            Counter::Escape => self.escape_retries.record_failure(),
            Counter::Ack => self.ack_retries.record_failure(),
        };

        match decision {
            RetryDecision::Retry => {
                debug!("{:?} in {:?}, retrying from {:?}", fault, self.state, restart);
                self.stats.retries = self.stats.retries.saturating_add(1);
                self.transition(restart, effects);
            }
            RetryDecision::Exhausted => {
                warn!("{:?} in {:?}, retries exhausted", fault, self.state);
                self.stats.transmissions_failed = self.stats.transmissions_failed.saturating_add(1);
                self.emit(
                    Effect::Status(TransmissionStatus::TransmissionFailure),
                    effects,
                );
                self.transition(State::Idle, effects);
            }
        }
    }
}
