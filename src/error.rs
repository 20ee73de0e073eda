//! Error taxonomy for link operations.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::sync::SyncError;

/// Error type for link operations.
///
/// Everything except [`LinkError::Open`], [`LinkError::Config`] and
/// [`LinkError::Io`] is a protocol-level failure of a single exchange; the
/// driver recovers those with one resynchronization and retry.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No bytes arrived before the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// Fewer bytes than required arrived before the deadline.
    #[error("short read: expected {expected} byte(s), received {received}")]
    ShortRead { expected: usize, received: usize },
    /// The stream accepted fewer bytes than were written.
    #[error("short write: {written} of {expected} byte(s) accepted")]
    ShortWrite { expected: usize, written: usize },
    /// A byte arrived that is not a valid response in the current state.
    #[error("unexpected byte {received:#04x}, expected {expected:#04x}")]
    UnexpectedByte { expected: u8, received: u8 },
    /// The device rejected the frame.
    #[error("device rejected the frame")]
    NotAcknowledged,
    /// The handshake did not reach SYNC_OK.
    #[error("synchronization failed: {0}")]
    Sync(#[from] SyncError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The stream could not be established.
    #[error("could not open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LinkError {
    /// Whether a resynchronization and retry may clear this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Open { .. } | Self::Config(_) | Self::Io(_))
    }
}
