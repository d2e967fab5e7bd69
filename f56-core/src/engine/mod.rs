//! Protocol engine
//!
//! One finite-state machine plays both link roles. As responder it answers
//! peer bids and assembles inbound frames; as initiator it bids for the line
//! and transmits a locally queued frame.
//!
//! # Architecture: Effect-Returning State Machine
//!
//! The engine does no I/O and owns no clock:
//! - Inputs are link events, deadline expiries and send requests
//! - Every input is processed to completion and returns [`Effects`]
//! - The driver writes `Send` bytes, delivers `Frame`s and `Status`es, and
//!   runs a timer for whatever [`Engine::deadline`] reports
//!
//! # State Machine
//!
//! ```text
//!            DLE                ENQ / ack               DLE          STX
//! ┌──────┐ ───────> ┌─────────┐ ───────> ┌───────────┐ ───> ┌────────────┐ ───> LengthField
//! │ Idle │          │ BidWait │          │ FrameSync │      │ FrameStart │      -> Payload
//! └──────┘ <─────── └─────────┘          └───────────┘ <─── └────────────┘      -> FrameEndEscape
//!    │  ^   ack + frame                        ^  nak                           -> FrameEnd
//!    │  └──────────────── ChecksumCheck ───────┘                                -> Checksum
//!    │ Send
//!    v
//! BidSend -> BidAckWait -> BidAck -> Transmit -> FrameAckWait -> FrameAck -> Idle
//! ```
//!
//! # Timeouts
//!
//! Entering any reply-expecting state arms a fresh deadline and leaving it
//! disarms it. An expiry only counts for the token currently armed.

mod assembly;
mod deadline;
mod effects;
mod initiator;
mod responder;
mod retry;

pub use assembly::InboundAssembly;
pub use deadline::Deadline;
pub use effects::{Effect, Effects, EngineStats, TransmissionStatus, MAX_EFFECTS};
pub use retry::{RetryCounter, RetryDecision};

use heapless::Vec;

use f56_protocol::{Checksum, Crc16, LinkEvent, RxMode, MAX_FRAME_SIZE};

use crate::config::{ConfigError, EngineConfig};
use crate::state::{DeadlineToken, Fault, Input, Role, State};

/// Errors returned to an application send request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// A cycle is already in progress; sends are accepted only in Idle
    Busy,
    /// Frame does not fit the transmit buffer
    PayloadTooLarge,
}

/// What a state handler is reacting to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Stimulus {
    Event(LinkEvent),
    Fault(Fault),
}

/// Link protocol engine
///
/// Exclusively owned by one link; run one instance per attached device.
#[derive(Debug, Clone)]
pub struct Engine<C: Checksum = Crc16> {
    /// Current state
    state: State,
    /// Timing and retry policy
    config: EngineConfig,
    /// Frame checksum service
    checksum: C,
    /// Reply deadline
    deadline: Deadline,
    /// Failures waiting for the DLE of a peer answer
    escape_retries: RetryCounter,
    /// Failures waiting for the ACK of a peer answer
    ack_retries: RetryCounter,
    /// Inbound frame being received
    assembly: InboundAssembly,
    /// Outbound frame being transmitted
    pending: Option<Vec<u8, MAX_FRAME_SIZE>>,
    /// Diagnostics
    stats: EngineStats,
}

impl<C: Checksum> Engine<C> {
    /// Create an engine in Idle
    ///
    /// # Errors
    /// Returns the validation error if `config` is unusable
    pub fn new(config: EngineConfig, checksum: C) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            state: State::Idle,
            config,
            checksum,
            deadline: Deadline::new(),
            escape_retries: RetryCounter::new(config.max_attempts),
            ack_retries: RetryCounter::new(config.max_attempts),
            assembly: InboundAssembly::new(),
            pending: None,
            stats: EngineStats::default(),
        })
    }

    /// Get current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check if the line is free for a new send
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get diagnostic counters
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Token of the armed deadline, if the current state awaits a reply
    pub fn deadline(&self) -> Option<DeadlineToken> {
        self.deadline.armed()
    }

    /// How the next received byte should be translated
    pub fn rx_mode(&self) -> RxMode {
        self.state.rx_mode()
    }

    /// Frame queued for transmission, while an initiator cycle runs
    pub fn pending(&self) -> Option<&[u8]> {
        self.pending.as_deref()
    }

    /// Failures recorded by the (escape, ack) retry counters
    pub fn retry_failures(&self) -> (u8, u8) {
        (self.escape_retries.failures(), self.ack_retries.failures())
    }

    /// Process any input
    ///
    /// # Errors
    /// Only `Input::Send` can fail, see [`Engine::send`]
    pub fn handle(&mut self, input: Input<'_>) -> Result<Effects, SendError> {
        match input {
            Input::Link(event) => Ok(self.handle_event(event)),
            Input::Timeout(token) => Ok(self.handle_timeout(token)),
            Input::Send(payload) => self.send(payload),
        }
    }

    /// Process one translated wire event
    pub fn handle_event(&mut self, event: LinkEvent) -> Effects {
        let stimulus = Fault::from_event(event).map_or(Stimulus::Event(event), Stimulus::Fault);
        let mut effects = Effects::new();
        self.dispatch(stimulus, &mut effects);
        effects
    }

    /// Process a deadline expiry
    ///
    /// A token that is no longer armed is ignored.
    pub fn handle_timeout(&mut self, token: DeadlineToken) -> Effects {
        let mut effects = Effects::new();

        if !self.deadline.expire(token) {
            trace!("Stale timeout {:?} ignored in {:?}", token, self.state);
            self.stats.stale_timeouts = self.stats.stale_timeouts.saturating_add(1);
            return effects;
        }

        debug!("Timeout in {:?}", self.state);
        self.dispatch(Stimulus::Fault(Fault::Timeout), &mut effects);
        effects
    }

    /// Queue `payload` for transmission and start bidding for the line
    ///
    /// `payload` goes on the wire verbatim once the bid is acknowledged; use
    /// [`f56_protocol::frame::encode`] to build a complete frame.
    ///
    /// # Errors
    /// - `Busy` outside Idle; nothing changes
    /// - `PayloadTooLarge` if it exceeds `MAX_FRAME_SIZE`
    pub fn send(&mut self, payload: &[u8]) -> Result<Effects, SendError> {
        if self.state != State::Idle {
            return Err(SendError::Busy);
        }

        let mut frame = Vec::new();
        frame
            .extend_from_slice(payload)
            .map_err(|_| SendError::PayloadTooLarge)?;
        self.pending = Some(frame);

        debug!("Send queued: {} bytes", payload.len());
        let mut effects = Effects::new();
        self.transition(State::BidSend, &mut effects);
        Ok(effects)
    }

    fn dispatch(&mut self, stimulus: Stimulus, effects: &mut Effects) {
        match self.state.role() {
            None => self.on_idle(stimulus, effects),
            Some(Role::Responder) => self.on_responder(stimulus, effects),
            Some(Role::Initiator) => self.on_initiator(stimulus, effects),
        }
    }

    fn on_idle(&mut self, stimulus: Stimulus, effects: &mut Effects) {
        match stimulus {
            Stimulus::Event(LinkEvent::LineBidByte1) => self.transition(State::BidWait, effects),
            Stimulus::Fault(fault) => self.abort(fault, effects),
            Stimulus::Event(event) => trace!("Idle: ignoring {:?}", event),
        }
    }

    /// Leave the current state and enter `next`
    fn transition(&mut self, next: State, effects: &mut Effects) {
        self.deadline.disarm();
        trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        self.enter(effects);
    }

    /// On-enter actions
    fn enter(&mut self, effects: &mut Effects) {
        if self.state.expects_reply() {
            self.deadline.arm();
        }

        match self.state {
            State::Idle => {
                self.escape_retries.reset();
                self.ack_retries.reset();
                self.pending = None;
            }
            State::FrameSync => self.assembly.reset(),
            State::ChecksumCheck => self.check_frame(effects),
            State::BidSend => self.send_bid(effects),
            State::BidAck | State::FrameAck => self.escape_retries.reset(),
            State::Transmit => self.transmit(effects),
            _ => {}
        }

        // Entry-only states have moved on by now, including nested entries
        debug_assert!(
            !self.state.is_transient(),
            "{:?} still current after its entry action",
            self.state
        );
    }

    fn emit(&mut self, effect: Effect, effects: &mut Effects) {
        if effects.push(effect).is_err() {
            warn!("Effect buffer full in {:?}, effect dropped", self.state);
        }
    }

    /// Responder abandons the cycle without telling the peer
    fn abort(&mut self, fault: Fault, effects: &mut Effects) {
        warn!("Abort in {:?}: {:?}", self.state, fault);
        self.stats.aborts = self.stats.aborts.saturating_add(1);
        self.transition(State::Idle, effects);
    }

    /// Responder rejects the frame and waits for it again
    fn nak_and_resync(&mut self, fault: Fault, effects: &mut Effects) {
        debug!("NAK in {:?}: {:?}", self.state, fault);
        self.stats.naks_sent = self.stats.naks_sent.saturating_add(1);
        self.emit(Effect::control(f56_protocol::codes::DLE_NAK), effects);
        self.transition(State::FrameSync, effects);
    }
}
