//! Engine configuration
//!
//! Timing and retry policy for one link. Stored the same way as other
//! device settings: postcard-serialized binary data with a version byte.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Default time to wait for each reply from the peer
pub const DEFAULT_REPLY_TIMEOUT_MS: u32 = 5000;

/// Default number of attempts per handshake phase
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Reply timeout of zero
    InvalidTimeout,
    /// Attempt budget of zero
    InvalidAttempts,
    /// Deserialization failed
    Deserialize,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Config version mismatch
    VersionMismatch,
}

/// Link timing and retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Format version
    pub version: u8,
    /// Deadline armed on entering every reply-expecting state
    pub reply_timeout_ms: u32,
    /// Attempts allowed per retry counter before the transmission fails
    pub max_attempts: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Set the reply timeout
    pub const fn with_reply_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.reply_timeout_ms = timeout_ms;
        self
    }

    /// Set the attempt budget
    pub const fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Check the values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.reply_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        Ok(())
    }

    /// Load a configuration from postcard binary data
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize into `buffer`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }
}
