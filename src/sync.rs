//! Handshake that re-establishes frame alignment with the device.
//!
//! The byte sequence is documented in [`pad_proto::handshake`]. The flush
//! step waits for the device's replies to settle before reading the latest
//! one, since a device in an unknown state answers anywhere from one to nine
//! times.
//!
//! Any failed step drops back to [`SyncState::OutOfSync`]; a new attempt
//! always starts from the flush.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};
use pad_proto::handshake::{
    COMMAND_SYNC_1, COMMAND_SYNC_2, FLUSH_LEN, FLUSH_SEQUENCE, RESP_SYNC_1, RESP_SYNC_OK,
    RESP_SYNC_START,
};
use thiserror::Error;

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::transport::{Transport, TransportSession};

/// Host-side handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    OutOfSync,
    /// Device answered the flush.
    SyncStart,
    /// Device answered sync-1.
    Sync1,
    /// Sync-2 sent, waiting for the final confirmation.
    Sync2,
    SyncOk,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutOfSync => "OUT_OF_SYNC",
            Self::SyncStart => "SYNC_START",
            Self::Sync1 => "SYNC_1",
            Self::Sync2 => "SYNC_2",
            Self::SyncOk => "SYNC_OK",
        })
    }
}

/// Why a handshake stopped short of [`SyncState::SyncOk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("flush: stream accepted {written} of 9 bytes")]
    FlushNotAccepted { written: usize },
    /// The device answered the flush with no bytes or more than a frame's worth.
    #[error("flush: expected 1 to 9 response bytes, received {received}")]
    FlushResponseCount { received: usize },
    #[error("{state}: expected {expected:#04x}, received {received:#04x}")]
    UnexpectedResponse {
        state: SyncState,
        expected: u8,
        received: u8,
    },
    #[error("{state}: no response")]
    NoResponse { state: SyncState },
    #[error("{state}: command byte not accepted")]
    CommandNotAccepted { state: SyncState },
}

/// Drives the handshake over a [`TransportSession`].
#[derive(Debug, Clone)]
pub struct Synchronizer {
    state: SyncState,
    settle_window: Duration,
    sync_timeout: Duration,
    poll_interval: Duration,
}

impl Synchronizer {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            state: SyncState::OutOfSync,
            settle_window: config.settle_window,
            sync_timeout: config.sync_timeout,
            poll_interval: config.poll_interval,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Mark the link as misaligned, e.g. after a failed exchange.
    pub fn invalidate(&mut self) {
        self.state = SyncState::OutOfSync;
    }

    /// Mark the link as aligned after the device acknowledged a frame.
    pub fn mark_synced(&mut self) {
        self.state = SyncState::SyncOk;
    }

    /// Run the full handshake from the flush.
    ///
    /// On success the state is [`SyncState::SyncOk`]; on failure it is
    /// [`SyncState::OutOfSync`] and the error names the step that failed.
    pub fn run<T: Transport>(
        &mut self,
        session: &mut TransportSession<T>,
    ) -> Result<(), LinkError> {
        self.state = SyncState::OutOfSync;

        while self.state != SyncState::SyncOk {
            match self.step(session) {
                Ok(next) => {
                    debug!("sync {} -> {}", self.state, next);
                    self.state = next;
                }
                Err(e) => {
                    error!("sync failed in {}: {}", self.state, e);
                    self.state = SyncState::OutOfSync;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn step<T: Transport>(
        &self,
        session: &mut TransportSession<T>,
    ) -> Result<SyncState, LinkError> {
        match self.state {
            SyncState::OutOfSync => self.flush(session),
            SyncState::SyncStart => {
                send_command(session, self.state, COMMAND_SYNC_1)?;
                expect_response(session, self.state, RESP_SYNC_1)?;
                Ok(SyncState::Sync1)
            }
            SyncState::Sync1 => {
                send_command(session, self.state, COMMAND_SYNC_2)?;
                Ok(SyncState::Sync2)
            }
            SyncState::Sync2 => {
                expect_response(session, self.state, RESP_SYNC_OK)?;
                Ok(SyncState::SyncOk)
            }
            SyncState::SyncOk => Ok(SyncState::SyncOk),
        }
    }

    fn flush<T: Transport>(
        &self,
        session: &mut TransportSession<T>,
    ) -> Result<SyncState, LinkError> {
        session.reset_input_buffer()?;

        let written = session.write_bytes(&FLUSH_SEQUENCE)?;
        if written != FLUSH_LEN {
            return Err(SyncError::FlushNotAccepted { written }.into());
        }

        let received = self.wait_for_settle(session)?;
        let latest = session.read_latest_discarding_rest()?;

        if !(1..=FLUSH_LEN).contains(&received) {
            return Err(SyncError::FlushResponseCount { received }.into());
        }
        match latest {
            Some(RESP_SYNC_START) => Ok(SyncState::SyncStart),
            Some(byte) => Err(SyncError::UnexpectedResponse {
                state: SyncState::OutOfSync,
                expected: RESP_SYNC_START,
                received: byte,
            }
            .into()),
            None => Err(SyncError::NoResponse {
                state: SyncState::OutOfSync,
            }
            .into()),
        }
    }

    /// Poll until no new bytes arrive for the settle window or the
    /// handshake timeout elapses. Returns the buffered byte count.
    fn wait_for_settle<T: Transport>(
        &self,
        session: &mut TransportSession<T>,
    ) -> Result<usize, LinkError> {
        let start = Instant::now();
        let mut last_change = start;
        let mut available = 0;

        loop {
            let now_available = session.bytes_available()?;
            if now_available != available {
                available = now_available;
                last_change = Instant::now();
            }

            let now = Instant::now();
            if now.duration_since(last_change) >= self.settle_window
                || now.duration_since(start) >= self.sync_timeout
            {
                break;
            }
            thread::sleep(self.poll_interval);
        }

        debug!("flush settled with {} byte(s) after {:?}", available, start.elapsed());
        Ok(available)
    }
}

fn send_command<T: Transport>(
    session: &mut TransportSession<T>,
    state: SyncState,
    command: u8,
) -> Result<(), LinkError> {
    if session.write_bytes(&[command])? != 1 {
        return Err(SyncError::CommandNotAccepted { state }.into());
    }
    Ok(())
}

fn expect_response<T: Transport>(
    session: &mut TransportSession<T>,
    state: SyncState,
    expected: u8,
) -> Result<(), LinkError> {
    match session.read_byte()? {
        Some(byte) if byte == expected => Ok(()),
        Some(received) => Err(SyncError::UnexpectedResponse {
            state,
            expected,
            received,
        }
        .into()),
        None => Err(SyncError::NoResponse { state }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::sim::{init_logging, DeviceState, SimulatedDevice};

    fn run(device: SimulatedDevice) -> (Result<(), LinkError>, Synchronizer, SimulatedDevice) {
        let config = LinkConfig::default().with_read_timeout(Duration::from_millis(20));
        run_with(device, &config)
    }

    fn run_with(
        device: SimulatedDevice,
        config: &LinkConfig,
    ) -> (Result<(), LinkError>, Synchronizer, SimulatedDevice) {
        init_logging();
        let mut session = TransportSession::new(device, config.read_timeout);
        let mut sync = Synchronizer::new(config);
        let result = sync.run(&mut session);
        (result, sync, session.into_inner())
    }

    fn sync_error(result: Result<(), LinkError>) -> SyncError {
        match result {
            Err(LinkError::Sync(e)) => e,
            other => panic!("expected sync error, got {other:?}"),
        }
    }

    #[test]
    fn test_sync_from_power_up() {
        let (result, sync, device) = run(SimulatedDevice::new());
        assert!(result.is_ok());
        assert_eq!(sync.state(), SyncState::SyncOk);
        assert_eq!(device.state(), DeviceState::Synced);

        let mut expected = FLUSH_SEQUENCE.to_vec();
        expected.extend([COMMAND_SYNC_1, COMMAND_SYNC_2]);
        assert_eq!(device.written(), expected.as_slice());
    }

    #[test]
    fn test_sync_from_synced_device() {
        let (result, sync, device) = run(SimulatedDevice::synced());
        assert!(result.is_ok());
        assert_eq!(sync.state(), SyncState::SyncOk);
        assert_eq!(device.state(), DeviceState::Synced);
    }

    #[test]
    fn test_garbage_sync_1_reply_stops_before_sync_2() {
        let (result, sync, device) = run(SimulatedDevice::new().with_sync_1_reply(0x00));
        assert_eq!(
            sync_error(result),
            SyncError::UnexpectedResponse {
                state: SyncState::SyncStart,
                expected: RESP_SYNC_1,
                received: 0x00,
            }
        );
        assert_eq!(sync.state(), SyncState::OutOfSync);

        let mut expected = FLUSH_SEQUENCE.to_vec();
        expected.push(COMMAND_SYNC_1);
        assert_eq!(device.written(), expected.as_slice());
    }

    #[test]
    fn test_wrong_final_confirmation() {
        let (result, sync, _) = run(SimulatedDevice::new().with_sync_ok_reply(0x92));
        assert_eq!(
            sync_error(result),
            SyncError::UnexpectedResponse {
                state: SyncState::Sync2,
                expected: RESP_SYNC_OK,
                received: 0x92,
            }
        );
        assert_eq!(sync.state(), SyncState::OutOfSync);
    }

    #[test]
    fn test_silent_device_reports_count() {
        let (result, sync, _) = run(SimulatedDevice::new().silent());
        assert_eq!(sync_error(result), SyncError::FlushResponseCount { received: 0 });
        assert_eq!(sync.state(), SyncState::OutOfSync);
    }

    #[test]
    fn test_too_many_flush_answers() {
        // From power-up each of the nine flush bytes is answered twice
        let device = SimulatedDevice::new().with_flush_trailer(RESP_SYNC_START);
        let (result, sync, device) = run(device);
        assert_eq!(sync_error(result), SyncError::FlushResponseCount { received: 18 });
        assert_eq!(sync.state(), SyncState::OutOfSync);
        assert_eq!(device.written(), FLUSH_SEQUENCE.as_slice());
    }

    #[test]
    fn test_latest_flush_answer_not_ready() {
        let (result, sync, device) = run(SimulatedDevice::synced().with_flush_trailer(0x5A));
        assert_eq!(
            sync_error(result),
            SyncError::UnexpectedResponse {
                state: SyncState::OutOfSync,
                expected: RESP_SYNC_START,
                received: 0x5A,
            }
        );
        assert_eq!(sync.state(), SyncState::OutOfSync);
        assert_eq!(device.written(), FLUSH_SEQUENCE.as_slice());
    }

    #[test]
    fn test_streaming_device_hits_sync_timeout() {
        let config = LinkConfig::default()
            .with_read_timeout(Duration::from_millis(20))
            .with_sync_timeout(Duration::from_millis(60));
        let start = Instant::now();
        let (result, _, _) = run_with(SimulatedDevice::new().streaming(), &config);
        let elapsed = start.elapsed();

        match sync_error(result) {
            SyncError::FlushResponseCount { received } => assert!(received > FLUSH_LEN),
            other => panic!("expected FlushResponseCount, got {other:?}"),
        }
        assert!(elapsed >= config.sync_timeout);
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_short_flush_write() {
        let (result, _, device) = run(SimulatedDevice::new().accept_at_most(4));
        assert_eq!(sync_error(result), SyncError::FlushNotAccepted { written: 4 });
        assert_eq!(device.written().len(), 4);
    }

    #[test]
    fn test_stale_input_discarded_before_flush() {
        let mut device = SimulatedDevice::synced();
        device.push_reply(&[0x91, 0x92, 0x00]);
        let (result, _, device) = run(device);
        assert!(result.is_ok());
        assert_eq!(device.clears(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SyncState::OutOfSync.to_string(), "OUT_OF_SYNC");
        assert_eq!(SyncState::Sync2.to_string(), "SYNC_2");
        assert_eq!(SyncState::SyncOk.to_string(), "SYNC_OK");
    }
}
