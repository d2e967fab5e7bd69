//! Bounded retry counters for the initiator handshake

/// Outcome of recording one failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryDecision {
    /// Budget left, restart the phase
    Retry,
    /// Budget spent, the transmission fails
    Exhausted,
}

/// Failure counter with a fixed attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryCounter {
    failures: u8,
    limit: u8,
}

impl RetryCounter {
    /// Create a counter allowing `limit` attempts
    pub const fn new(limit: u8) -> Self {
        Self { failures: 0, limit }
    }

    /// Record one failed attempt
    pub fn record_failure(&mut self) -> RetryDecision {
        self.failures = self.failures.saturating_add(1);
        if self.failures < self.limit {
            RetryDecision::Retry
        } else {
            RetryDecision::Exhausted
        }
    }

    /// Start counting again from zero
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Failures recorded since the last reset
    pub fn failures(&self) -> u8 {
        self.failures
    }
}
