//! Engine states, inputs and faults
//!
//! The engine is explicit, finite, and deterministic: one active state,
//! one input processed to completion at a time.

pub mod events;
pub mod machine;

pub use events::{DeadlineToken, Fault, Input};
pub use machine::{Role, State};
