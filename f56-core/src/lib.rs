//! Transport-agnostic protocol engine for the F56 bisync link
//!
//! This crate contains the link logic that does not depend on any particular
//! transport or timer:
//!
//! - Link states and the events and faults that move between them
//! - The protocol engine for both the responder and initiator roles
//! - Inbound frame assembly and checksum validation
//! - Reply deadline and bounded retry bookkeeping
//! - Engine configuration
//!
//! The engine is fed [`f56_protocol::LinkEvent`]s, deadline expiries and send
//! requests, and answers each with a list of [`engine::Effect`]s for the
//! caller to carry out.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod engine;
pub mod state;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Effect, Effects, Engine, EngineStats, SendError, TransmissionStatus};
pub use state::{DeadlineToken, Fault, Input, State};
