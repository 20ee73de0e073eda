use std::time::{Duration, Instant};

use log::{info, trace, warn};
use pad_proto::{parse_ack, AckResult, LogicalCommand, ReportPacket, FRAME_LEN, RESP_UPDATE_ACK};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::stats::{LatencyError, LatencyReport, LinkStats, MAX_ERROR_RATE};
use crate::sync::{SyncState, Synchronizer};
use crate::transport::{Transport, TransportSession};

/// Sends logical commands to the device and keeps the link aligned.
///
/// Each command is framed, written, and answered by one ack byte. Any
/// protocol-level failure triggers one handshake and, if that succeeds, one
/// retry of the same frame.
///
/// # Error Handling
///
/// A failed send never poisons the driver: the next call starts a fresh
/// exchange. Transport I/O errors are returned without a resync.
pub struct ProtocolDriver<T> {
    session: TransportSession<T>,
    sync: Synchronizer,
    stats: LinkStats,
    last_error: Option<LinkError>,
}

impl<T: Transport> ProtocolDriver<T> {
    /// Create a driver over a connected transport with default timings.
    pub fn new(transport: T) -> Self {
        Self::build(transport, &LinkConfig::default())
    }

    pub fn with_config(transport: T, config: &LinkConfig) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self::build(transport, config))
    }

    fn build(transport: T, config: &LinkConfig) -> Self {
        Self {
            session: TransportSession::new(transport, config.read_timeout),
            sync: Synchronizer::new(config),
            stats: LinkStats::default(),
            last_error: None,
        }
    }

    /// Send a command, returning whether the device acknowledged it.
    ///
    /// The failure reason is kept in [`last_error`](Self::last_error).
    pub fn send_logical_command(&mut self, cmd: LogicalCommand) -> bool {
        match self.send_command(cmd) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                warn!("command {:?} not delivered: {}", cmd, e);
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Send a command with at most one resync and retry.
    pub fn send_command(&mut self, cmd: LogicalCommand) -> Result<(), LinkError> {
        let packet = ReportPacket::from_command(cmd);
        self.send_packet(&packet)
    }

    /// Send an already framed packet with at most one resync and retry.
    pub fn send_packet(&mut self, packet: &ReportPacket) -> Result<(), LinkError> {
        match self.exchange(packet) {
            Ok(()) => Ok(()),
            Err(e) if !e.is_recoverable() => Err(e),
            Err(e) => {
                warn!("{}, resynchronizing", e);
                self.synchronize()?;
                self.exchange(packet)
            }
        }
    }

    /// Run the handshake now.
    pub fn synchronize(&mut self) -> Result<(), LinkError> {
        let result = self.sync.run(&mut self.session);
        self.stats.record_sync(&result);
        if result.is_ok() {
            info!("link synchronized");
        }
        result
    }

    /// Whether the last handshake or exchange left the link aligned.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.sync.state() == SyncState::SyncOk
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    #[must_use]
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Reason the most recent [`send_logical_command`](Self::send_logical_command)
    /// returned `false`.
    #[must_use]
    pub fn last_error(&self) -> Option<&LinkError> {
        self.last_error.as_ref()
    }

    /// Measure round-trip time with `samples` neutral frames.
    ///
    /// Synchronizes first if the link is not aligned. Each frame gets a
    /// single exchange without resync; frames that are not acknowledged
    /// count as errors and are left out of the timing.
    pub fn measure_latency(&mut self, samples: usize) -> Result<LatencyReport, LatencyError> {
        if !self.is_synced() {
            self.synchronize().map_err(LatencyError::Sync)?;
        }

        let packet = ReportPacket::neutral();
        let mut acked: Vec<Duration> = Vec::with_capacity(samples);
        for _ in 0..samples {
            let start = Instant::now();
            if self.exchange(&packet).is_ok() {
                acked.push(start.elapsed());
            }
        }

        let report = LatencyReport::from_samples(samples, &acked)
            .ok_or(LatencyError::NoAcks { samples })?;
        info!(
            "latency over {} frame(s): min {:?}, max {:?}, avg {:?}, {} error(s)",
            report.samples, report.min, report.max, report.avg, report.errors
        );
        Ok(report)
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &TransportSession<T> {
        &self.session
    }

    /// Get a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut TransportSession<T> {
        &mut self.session
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        self.session.get_ref()
    }

    /// Decompose the driver into its transport.
    pub fn into_inner(self) -> T {
        self.session.into_inner()
    }

    /// One frame out, one ack byte back.
    fn exchange(&mut self, packet: &ReportPacket) -> Result<(), LinkError> {
        let result = self.try_exchange(packet);
        match &result {
            Ok(()) => {
                self.sync.mark_synced();
                self.stats.record_ack();
            }
            Err(e) => {
                self.sync.invalidate();
                self.stats.record_failure(e);
                if self.stats.is_degraded() {
                    warn!("error rate {:.3} above {}", self.stats.error_rate, MAX_ERROR_RATE);
                }
            }
        }
        result
    }

    fn try_exchange(&mut self, packet: &ReportPacket) -> Result<(), LinkError> {
        let written = self.session.write_bytes(packet.as_bytes())?;
        if written < FRAME_LEN {
            return Err(LinkError::ShortWrite {
                expected: FRAME_LEN,
                written,
            });
        }
        self.stats.frames_sent += 1;

        let mut reply = [0u8; 1];
        let timeout = self.session.read_timeout();
        self.session.expect_bytes(&mut reply, timeout)?;

        match parse_ack(reply[0]) {
            AckResult::Acknowledged => {
                trace!("ack {:?}", packet);
                Ok(())
            }
            AckResult::NotAcknowledged => Err(LinkError::NotAcknowledged),
            AckResult::Unexpected(received) => Err(LinkError::UnexpectedByte {
                expected: RESP_UPDATE_ACK,
                received,
            }),
        }
    }
}

#[cfg(feature = "serial")]
impl ProtocolDriver<crate::transport::SerialTransport> {
    /// Open a serial port and wrap it in a driver.
    pub fn open_serial(port: &str, config: &LinkConfig) -> Result<Self, LinkError> {
        let transport = crate::transport::SerialTransport::open(port, config)?;
        Ok(Self::build(transport, config))
    }
}
