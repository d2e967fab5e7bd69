//! F56 Link Wire Protocol
//!
//! This crate defines the byte-level vocabulary of the half-duplex bisync
//! link between the host and an F56-family peripheral: control codes,
//! the events the engine consumes, the frame checksum and the frame layout.
//!
//! # Protocol Overview
//!
//! A sender first bids for the line with DLE ENQ and waits for DLE ACK. It
//! then sends one frame:
//! ```text
//! ┌─────────┬────────┬─────────────┬─────────┬────────┐
//! │ DLE STX │ LENGTH │ PAYLOAD     │ DLE ETX │ CRC    │
//! │ 2B      │ 2B BE  │ LENGTH B    │ 2B      │ 2B LE  │
//! └─────────┴────────┴─────────────┴─────────┴────────┘
//! ```
//! and the receiver answers DLE ACK (accepted) or DLE NAK (send again).

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod codes;
pub mod events;
pub mod frame;
pub mod translator;

pub use checksum::{Checksum, Crc16};
pub use events::LinkEvent;
pub use frame::{FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use translator::{translate, RxMode};
