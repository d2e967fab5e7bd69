//! The single reply deadline
//!
//! The engine never owns a clock. It arms and disarms one logical deadline
//! and hands out a [`DeadlineToken`] per arming; whoever runs the timer
//! reports expiry with that token.

use crate::state::DeadlineToken;

/// At most one outstanding reply deadline
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    /// Incremented on every arming
    generation: u32,
    /// Currently armed token
    armed: Option<DeadlineToken>,
}

impl Deadline {
    /// Create a disarmed deadline
    pub const fn new() -> Self {
        Self {
            generation: 0,
            armed: None,
        }
    }

    /// Arm a fresh deadline, replacing any previous one
    pub fn arm(&mut self) -> DeadlineToken {
        self.generation = self.generation.wrapping_add(1);
        let token = DeadlineToken(self.generation);
        self.armed = Some(token);
        token
    }

    /// Cancel the armed deadline, if any
    pub fn disarm(&mut self) -> Option<DeadlineToken> {
        self.armed.take()
    }

    /// Currently armed token
    pub fn armed(&self) -> Option<DeadlineToken> {
        self.armed
    }

    /// Consume an expiry for `token`
    ///
    /// Returns true (and disarms) only if `token` is the armed one.
    pub fn expire(&mut self, token: DeadlineToken) -> bool {
        if self.armed == Some(token) {
            self.armed = None;
            true
        } else {
            false
        }
    }
}
