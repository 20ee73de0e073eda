//! Link statistics and latency measurement results.

use std::time::Duration;

use thiserror::Error;

use crate::error::LinkError;

/// Weight of each new sample in the error-rate filter.
pub const ERROR_RATE_WEIGHT: f32 = 0.005;

/// Error rate above which the link is reported as degraded.
pub const MAX_ERROR_RATE: f32 = 0.08;

/// Counters for one link.
///
/// `error_rate` is a first-order low-pass filter over exchange outcomes
/// (1.0 for a failure, 0.0 for an ack). It restarts at zero after every
/// successful handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinkStats {
    /// Frames written in full.
    pub frames_sent: u64,
    pub acknowledged: u64,
    pub rejected: u64,
    /// Replies that were neither ACK nor NACK.
    pub unexpected: u64,
    /// Exchanges with a missing reply or a short write.
    pub incomplete: u64,
    pub resyncs: u64,
    pub sync_failures: u64,
    pub error_rate: f32,
}

impl LinkStats {
    pub(crate) fn record_ack(&mut self) {
        self.acknowledged += 1;
        self.sample(0.0);
    }

    pub(crate) fn record_failure(&mut self, error: &LinkError) {
        match error {
            LinkError::NotAcknowledged => self.rejected += 1,
            LinkError::UnexpectedByte { .. } => self.unexpected += 1,
            _ => self.incomplete += 1,
        }
        self.sample(1.0);
    }

    pub(crate) fn record_sync(&mut self, result: &Result<(), LinkError>) {
        self.resyncs += 1;
        match result {
            Ok(()) => self.error_rate = 0.0,
            Err(_) => self.sync_failures += 1,
        }
    }

    fn sample(&mut self, value: f32) {
        self.error_rate -= ERROR_RATE_WEIGHT * (self.error_rate - value);
    }

    /// Whether the filtered error rate exceeds [`MAX_ERROR_RATE`].
    ///
    /// The driver only logs this; callers may use it to decide when to
    /// reconnect or slow down.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error_rate > MAX_ERROR_RATE
    }
}

/// Round-trip times from [`ProtocolDriver::measure_latency`].
///
/// [`ProtocolDriver::measure_latency`]: crate::ProtocolDriver::measure_latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyReport {
    pub samples: usize,
    /// Frames that were not acknowledged.
    pub errors: usize,
    pub min: Duration,
    pub max: Duration,
    /// Mean over acknowledged frames.
    pub avg: Duration,
}

impl LatencyReport {
    /// Summarize per-frame round-trip times; `None` when no frame was acked.
    pub(crate) fn from_samples(samples: usize, acked: &[Duration]) -> Option<Self> {
        let min = acked.iter().min().copied()?;
        let max = acked.iter().max().copied()?;
        let total: Duration = acked.iter().sum();
        let count = u32::try_from(acked.len()).unwrap_or(u32::MAX);

        Some(Self {
            samples,
            errors: samples - acked.len(),
            min,
            max,
            avg: total / count,
        })
    }
}

/// Why a latency measurement produced no report.
#[derive(Debug, Error)]
pub enum LatencyError {
    #[error("could not synchronize before measuring: {0}")]
    Sync(#[source] LinkError),
    #[error("none of {samples} frame(s) were acknowledged")]
    NoAcks { samples: usize },
}
