//! Responder path: answering a peer bid and receiving its frame
//!
//! A corrupt or interrupted frame is NAKed and waited for again with no
//! retry ceiling; the peer decides when to give up. A length field above
//! [`MAX_PAYLOAD_SIZE`] is rejected the same way, so frames longer than
//! that are never delivered.

use f56_protocol::codes::DLE_ACK;
use f56_protocol::{Checksum, LinkEvent, MAX_PAYLOAD_SIZE};

use super::{Effect, Effects, Engine, Stimulus};
use crate::state::{Fault, State};

impl<C: Checksum> Engine<C> {
    pub(super) fn on_responder(&mut self, stimulus: Stimulus, effects: &mut Effects) {
        use LinkEvent::*;
        use Stimulus::{Event, Fault as Failure};

        match (self.state, stimulus) {
            // BidWait: peer sent DLE, expect ENQ
            (State::BidWait, Event(LineBidByte2)) => {
                self.emit(Effect::control(DLE_ACK), effects);
                self.transition(State::FrameSync, effects);
            }
            (State::BidWait, Failure(fault)) => self.abort(fault, effects),
            (State::BidWait, Event(_)) => self.transition(State::Idle, effects),

            // FrameSync: expect the DLE opening the frame
            (State::FrameSync, Event(event)) if event.is_escape() => {
                self.transition(State::FrameStart, effects)
            }
            (State::FrameSync, Failure(Fault::Timeout)) => self.transition(State::Idle, effects),
            (State::FrameSync, Failure(fault)) => self.abort(fault, effects),
            (State::FrameSync, Event(_)) => self.transition(State::BidWait, effects),

            // FrameStart: expect STX
            (State::FrameStart, Event(event)) if event.is_escape() => {
                self.transition(State::FrameSync, effects)
            }
            (State::FrameStart, Event(LineBidByte2)) => {
                // Peer repeated its bid; our ACK was lost
                self.emit(Effect::control(DLE_ACK), effects);
                self.transition(State::FrameSync, effects);
            }
            (State::FrameStart, Event(FrameStartMarker)) => {
                self.transition(State::LengthField, effects)
            }
            (State::FrameStart, Event(_)) => self.nak_and_resync(Fault::UnexpectedEvent, effects),
            (State::FrameStart, Failure(fault)) => self.nak_and_resync(fault, effects),

            // Collecting states
            (State::LengthField, Event(DataByte(byte))) => self.collect_length(byte, effects),
            (State::Payload, Event(DataByte(byte))) => {
                if self.assembly.push_data(byte) {
                    self.transition(State::FrameEndEscape, effects);
                }
            }
            (State::Checksum, Event(DataByte(byte))) => {
                if self.assembly.push_checksum(byte) {
                    self.transition(State::ChecksumCheck, effects);
                }
            }
            (State::LengthField | State::Payload | State::Checksum, Failure(fault)) => {
                self.nak_and_resync(fault, effects)
            }
            (State::LengthField | State::Payload | State::Checksum, Event(event)) => {
                trace!("{:?}: ignoring {:?}", self.state, event)
            }

            // FrameEndEscape: expect the DLE closing the frame
            (State::FrameEndEscape, Event(event)) if event.is_escape() => {
                self.transition(State::FrameEnd, effects)
            }
            (State::FrameEndEscape, Event(_)) => {
                self.nak_and_resync(Fault::UnexpectedEvent, effects)
            }
            (State::FrameEndEscape, Failure(fault)) => self.nak_and_resync(fault, effects),

            // FrameEnd: expect ETX
            (State::FrameEnd, Event(FrameEndMarker)) => self.transition(State::Checksum, effects),
            (State::FrameEnd, Event(_)) => self.nak_and_resync(Fault::UnexpectedEvent, effects),
            (State::FrameEnd, Failure(fault)) => self.nak_and_resync(fault, effects),

            // ChecksumCheck is entry-only and never waits for input
            (state, stimulus) => trace!("{:?}: unhandled {:?}", state, stimulus),
        }
    }

    fn collect_length(&mut self, byte: u8, effects: &mut Effects) {
        match self.assembly.push_length(byte) {
            None => {}
            Some(length) if length > MAX_PAYLOAD_SIZE => {
                warn!("Frame length {} exceeds {}", length, MAX_PAYLOAD_SIZE);
                self.nak_and_resync(Fault::LengthOverflow, effects);
            }
            Some(0) => self.transition(State::FrameEndEscape, effects),
            Some(_) => self.transition(State::Payload, effects),
        }
    }

    /// ChecksumCheck on-enter action
    pub(super) fn check_frame(&mut self, effects: &mut Effects) {
        if !self.assembly.is_valid(&self.checksum) {
            self.stats.checksum_failures = self.stats.checksum_failures.saturating_add(1);
            self.nak_and_resync(Fault::ChecksumMismatch, effects);
            return;
        }

        let payload = self.assembly.payload().clone();
        info!("Frame received: {} bytes", payload.len());
        self.stats.frames_received = self.stats.frames_received.saturating_add(1);

        self.emit(Effect::control(DLE_ACK), effects);
        self.emit(Effect::Frame(payload), effects);
        self.transition(State::Idle, effects);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::EngineConfig;
    use f56_protocol::codes::{DLE, DLE_NAK, ENQ, ETX, STX};
    use f56_protocol::frame::encode_to_vec;
    use f56_protocol::{translate, Crc16};
    use std::vec::Vec;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Crc16).unwrap()
    }

    fn feed(engine: &mut Engine, bytes: &[u8]) -> Vec<Effect> {
        let mut out = Vec::new();
        for &byte in bytes {
            out.extend(engine.handle_event(translate(byte, engine.rx_mode())));
        }
        out
    }

    fn expire(engine: &mut Engine) -> Vec<Effect> {
        let token = engine.deadline().unwrap();
        engine.handle_timeout(token).into_iter().collect()
    }

    fn frames(effects: &[Effect]) -> Vec<&[u8]> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Frame(payload) => Some(payload.as_slice()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bid_is_acknowledged() {
        let mut engine = engine();
        let effects = feed(&mut engine, &[DLE, ENQ]);

        assert_eq!(effects, [Effect::control(DLE_ACK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_bid_wait_other_byte_returns_idle() {
        let mut engine = engine();
        let effects = feed(&mut engine, &[DLE, 0x41]);
        assert!(effects.is_empty());
        assert!(engine.is_idle());
    }

    #[test]
    fn test_bid_wait_timeout_aborts_without_nak() {
        let mut engine = engine();
        feed(&mut engine, &[DLE]);
        let effects = expire(&mut engine);

        assert!(effects.is_empty());
        assert!(engine.is_idle());
        assert_eq!(engine.stats().aborts, 1);
    }

    #[test]
    fn test_bid_wait_line_error_aborts() {
        let mut engine = engine();
        feed(&mut engine, &[DLE]);
        let effects = engine.handle_event(LinkEvent::LineError);

        assert!(effects.is_empty());
        assert!(engine.is_idle());
        assert_eq!(engine.stats().aborts, 1);
        assert_eq!(engine.stats().naks_sent, 0);
    }

    #[test]
    fn test_frame_sync_timeout_is_silent() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = expire(&mut engine);

        assert!(effects.is_empty());
        assert!(engine.is_idle());
        assert_eq!(engine.stats().aborts, 0);
    }

    #[test]
    fn test_frame_sync_line_error_aborts() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = engine.handle_event(LinkEvent::LineError);

        assert!(effects.is_empty());
        assert!(engine.is_idle());
        assert_eq!(engine.stats().aborts, 1);
    }

    #[test]
    fn test_frame_sync_unexpected_goes_to_bid_wait() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        engine.handle_event(LinkEvent::AckByte);
        assert_eq!(engine.state(), State::BidWait);
    }

    #[test]
    fn test_repeated_bid_is_acknowledged_again() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = feed(&mut engine, &[DLE, ENQ]);

        assert_eq!(effects, [Effect::control(DLE_ACK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_frame_start_double_escape_resyncs() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE]);
        assert_eq!(engine.state(), State::FrameStart);

        let effects = feed(&mut engine, &[DLE]);
        assert!(effects.is_empty());
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_frame_start_garbage_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE]);
        let effects = feed(&mut engine, &[0x41]);

        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_frame_start_timeout_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE]);
        let effects = expire(&mut engine);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_receives_frame_with_control_bytes_in_payload() {
        let payload = [DLE, STX, ETX, ENQ, 0x00];
        let wire = encode_to_vec(&Crc16, &payload).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = feed(&mut engine, &wire);

        assert_eq!(effects[0], Effect::control(DLE_ACK));
        assert_eq!(frames(&effects), [&payload[..]]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_zero_length_frame() {
        let wire = encode_to_vec(&Crc16, &[]).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = feed(&mut engine, &wire);

        let empty: &[u8] = &[];
        assert_eq!(effects.len(), 2);
        assert_eq!(frames(&effects), [empty]);
    }

    #[test]
    fn test_timeout_mid_payload_naks() {
        let wire = encode_to_vec(&Crc16, &[1, 2, 3, 4]).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        feed(&mut engine, &wire[..6]);
        assert_eq!(engine.state(), State::Payload);

        let effects = expire(&mut engine);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_deadline_not_extended_by_data() {
        let wire = encode_to_vec(&Crc16, &[1, 2, 3, 4]).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        feed(&mut engine, &wire[..5]);
        let armed = engine.deadline();
        feed(&mut engine, &wire[5..7]);

        assert_eq!(engine.state(), State::Payload);
        assert_eq!(engine.deadline(), armed);
    }

    #[test]
    fn test_missing_end_escape_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX, 0x00, 0x01, 0xAA]);
        assert_eq!(engine.state(), State::FrameEndEscape);

        let effects = feed(&mut engine, &[ETX]);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
    }

    #[test]
    fn test_missing_end_marker_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX, 0x00, 0x01, 0xAA, DLE]);
        assert_eq!(engine.state(), State::FrameEnd);

        let effects = feed(&mut engine, &[0x42]);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
    }

    #[test]
    fn test_frame_end_escape_timeout_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX, 0x00, 0x01, 0xAA]);
        assert_eq!(engine.state(), State::FrameEndEscape);

        let effects = expire(&mut engine);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_frame_end_timeout_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX, 0x00, 0x01, 0xAA, DLE]);
        assert_eq!(engine.state(), State::FrameEnd);

        let effects = expire(&mut engine);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_checksum_timeout_naks() {
        let wire = encode_to_vec(&Crc16, &[0x05, 0x06]).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        feed(&mut engine, &wire[..wire.len() - 2]);
        assert_eq!(engine.state(), State::Checksum);

        let effects = expire(&mut engine);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
        assert_eq!(engine.stats().frames_received, 0);
    }

    #[test]
    fn test_checksum_line_error_naks() {
        let wire = encode_to_vec(&Crc16, &[0x05, 0x06]).unwrap();

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        feed(&mut engine, &wire[..wire.len() - 1]);
        assert_eq!(engine.state(), State::Checksum);

        let effects = engine.handle_event(LinkEvent::LineError);
        assert_eq!(effects[..], [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);

        // The retransmission after the NAK starts from a clean assembly
        let effects = feed(&mut engine, &wire);
        assert_eq!(frames(&effects), [&[0x05u8, 0x06][..]]);
    }

    #[test]
    fn test_oversized_length_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX]);
        let effects = feed(&mut engine, &[0xFF, 0xFF]);

        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);
    }

    #[test]
    fn test_line_error_while_collecting_naks() {
        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ, DLE, STX, 0x00]);
        let effects = engine.handle_event(LinkEvent::LineError);

        assert_eq!(effects[..], [Effect::control(DLE_NAK)]);
    }

    #[test]
    fn test_retransmission_after_bad_checksum() {
        let payload: [u8; 3] = [0x10, 0x20, 0x30];
        let wire = encode_to_vec(&Crc16, &payload).unwrap();
        let mut corrupt = wire.clone();
        corrupt[5] ^= 0x80;

        let mut engine = engine();
        feed(&mut engine, &[DLE, ENQ]);
        let effects = feed(&mut engine, &corrupt);
        assert_eq!(effects, [Effect::control(DLE_NAK)]);
        assert_eq!(engine.state(), State::FrameSync);

        let effects = feed(&mut engine, &wire);
        assert_eq!(effects[0], Effect::control(DLE_ACK));
        assert_eq!(frames(&effects), [&payload[..]]);
        assert_eq!(engine.stats().checksum_failures, 1);
        assert_eq!(engine.stats().frames_received, 1);
    }
}
