//! Link configuration.
//!
//! All timings used by the session, the handshake and the driver live in
//! [`LinkConfig`]. With the `serde` feature it can be loaded from TOML or
//! JSON; durations are written as whole milliseconds.
//!
//! ```
//! use std::time::Duration;
//! use pad_link::LinkConfig;
//!
//! let config = LinkConfig::default()
//!     .with_baud_rate(115_200)
//!     .with_read_timeout(Duration::from_millis(200));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use thiserror::Error;

/// Baud rate the device firmware runs at.
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

/// Slowest supported baud rate.
pub const MIN_BAUD_RATE: u32 = 9_600;

/// Fastest supported baud rate.
pub const MAX_BAUD_RATE: u32 = 1_000_000;

/// Error type for configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("baud rate {0} outside 9600..=1000000")]
    BaudRate(u32),
    /// A timing value that must be positive is zero.
    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),
    #[error("settle window must be shorter than the handshake timeout")]
    SettleWindow,
}

/// Timings and serial parameters for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Symmetric baud rate, 8N1, no flow control.
    pub baud_rate: u32,
    /// How long to wait for an ack or handshake response byte.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub read_timeout: Duration,
    /// Idle time after which the device is considered done answering a flush.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub settle_window: Duration,
    /// Upper bound on waiting for flush responses to settle.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub sync_timeout: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub poll_interval: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_secs(1),
            settle_window: Duration::from_millis(18),
            sync_timeout: Duration::from_millis(250),
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl LinkConfig {
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_settle_window(mut self, window: Duration) -> Self {
        self.settle_window = window;
        self
    }

    #[must_use]
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BAUD_RATE..=MAX_BAUD_RATE).contains(&self.baud_rate) {
            return Err(ConfigError::BaudRate(self.baud_rate));
        }
        for (name, value) in [
            ("read_timeout", self.read_timeout),
            ("settle_window", self.settle_window),
            ("sync_timeout", self.sync_timeout),
            ("poll_interval", self.poll_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        if self.settle_window >= self.sync_timeout {
            return Err(ConfigError::SettleWindow);
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
