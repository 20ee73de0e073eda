//! In-memory device for tests.
//!
//! [`SimulatedDevice`] runs the device side of the protocol byte by byte:
//! handshake states, 9-byte frame accumulation with checksum, ACK/NACK.
//! Replies land in a receive queue the host reads through [`Transport`].
//! Faults can be injected per test.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use pad_proto::handshake::{
    COMMAND_SYNC_1, COMMAND_SYNC_2, COMMAND_SYNC_START, RESP_SYNC_1, RESP_SYNC_OK,
    RESP_SYNC_START,
};
use pad_proto::{ReportPacket, FRAME_LEN, PAYLOAD_LEN, RESP_UPDATE_ACK, RESP_UPDATE_NACK};

use crate::transport::traits::Transport;

/// Install a test logger once; output shows with `--nocapture`.
pub(crate) fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeviceState {
    OutOfSync,
    SyncStart,
    Sync1,
    Synced,
}

pub(crate) struct SimulatedDevice {
    state: DeviceState,
    payload: [u8; PAYLOAD_LEN],
    received: usize,
    rx: VecDeque<u8>,
    written: Vec<u8>,
    accepted: Vec<ReportPacket>,
    frames_seen: usize,
    clears: usize,
    // Fault injection
    reject_frames: usize,
    reject_all: bool,
    sync_1_reply: Option<u8>,
    sync_ok_reply: Option<u8>,
    silent: bool,
    accept_limit: Option<usize>,
    flush_trailer: Option<u8>,
    streaming: bool,
}

impl SimulatedDevice {
    /// A device that has just powered up and waits for a handshake.
    pub(crate) fn new() -> Self {
        Self {
            state: DeviceState::OutOfSync,
            payload: [0; PAYLOAD_LEN],
            received: 0,
            rx: VecDeque::new(),
            written: Vec::new(),
            accepted: Vec::new(),
            frames_seen: 0,
            clears: 0,
            reject_frames: 0,
            reject_all: false,
            sync_1_reply: None,
            sync_ok_reply: None,
            silent: false,
            accept_limit: None,
            flush_trailer: None,
            streaming: false,
        }
    }

    /// A device already aligned with the host.
    pub(crate) fn synced() -> Self {
        Self {
            state: DeviceState::Synced,
            ..Self::new()
        }
    }

    /// Answer the next `count` valid frames with NACK.
    pub(crate) fn reject_frames(mut self, count: usize) -> Self {
        self.reject_frames = count;
        self
    }

    /// Answer every frame with NACK.
    pub(crate) fn reject_all(mut self) -> Self {
        self.reject_all = true;
        self
    }

    /// Reply `byte` instead of 0xCC to the sync-1 command.
    pub(crate) fn with_sync_1_reply(mut self, byte: u8) -> Self {
        self.sync_1_reply = Some(byte);
        self
    }

    /// Reply `byte` instead of 0x33 to the sync-2 command.
    pub(crate) fn with_sync_ok_reply(mut self, byte: u8) -> Self {
        self.sync_ok_reply = Some(byte);
        self
    }

    /// Process input but never reply.
    pub(crate) fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Accept at most `limit` bytes per write call.
    pub(crate) fn accept_at_most(mut self, limit: usize) -> Self {
        self.accept_limit = Some(limit);
        self
    }

    /// Follow every 0xFF flush answer with `byte`.
    pub(crate) fn with_flush_trailer(mut self, byte: u8) -> Self {
        self.flush_trailer = Some(byte);
        self
    }

    /// Emit a 0xFF every time the host polls for buffered bytes, so the
    /// input never goes idle.
    pub(crate) fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub(crate) fn state(&self) -> DeviceState {
        self.state
    }

    /// Every byte the host wrote, in order.
    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }

    /// Frames answered with ACK.
    pub(crate) fn accepted(&self) -> &[ReportPacket] {
        &self.accepted
    }

    /// Complete 9-byte frames received while synced, accepted or not.
    pub(crate) fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// How many times the host discarded its input buffer.
    pub(crate) fn clears(&self) -> usize {
        self.clears
    }

    /// Queue bytes for the host to read.
    pub(crate) fn push_reply(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    fn reply(&mut self, byte: u8) {
        if !self.silent {
            self.rx.push_back(byte);
        }
    }

    fn answer_flush(&mut self) {
        self.reply(RESP_SYNC_START);
        if let Some(byte) = self.flush_trailer {
            self.reply(byte);
        }
    }

    fn receive(&mut self, byte: u8) {
        match self.state {
            DeviceState::Synced => {
                if self.received < PAYLOAD_LEN {
                    self.payload[self.received] = byte;
                    self.received += 1;
                } else {
                    self.finish_frame(byte);
                }
            }
            DeviceState::SyncStart => {
                if byte == COMMAND_SYNC_1 {
                    self.state = DeviceState::Sync1;
                    self.reply(self.sync_1_reply.unwrap_or(RESP_SYNC_1));
                } else {
                    self.state = DeviceState::OutOfSync;
                }
            }
            DeviceState::Sync1 => {
                if byte == COMMAND_SYNC_2 {
                    self.state = DeviceState::Synced;
                    self.reply(self.sync_ok_reply.unwrap_or(RESP_SYNC_OK));
                } else {
                    self.state = DeviceState::OutOfSync;
                }
            }
            DeviceState::OutOfSync => {}
        }

        // Evaluated after the transition above, so a failed handshake step
        // that receives 0xFF restarts immediately.
        if self.state == DeviceState::OutOfSync && byte == COMMAND_SYNC_START {
            self.state = DeviceState::SyncStart;
            self.answer_flush();
        }
    }

    fn finish_frame(&mut self, checksum: u8) {
        let mut frame = [0u8; FRAME_LEN];
        frame[..PAYLOAD_LEN].copy_from_slice(&self.payload);
        frame[PAYLOAD_LEN] = checksum;
        self.received = 0;

        match ReportPacket::from_wire(&frame) {
            Err(_) if checksum == COMMAND_SYNC_START => {
                self.state = DeviceState::SyncStart;
                self.answer_flush();
            }
            Err(_) => {
                self.frames_seen += 1;
                self.reply(RESP_UPDATE_NACK);
            }
            Ok(packet) => {
                self.frames_seen += 1;
                if self.reject_all || self.reject_frames > 0 {
                    self.reject_frames = self.reject_frames.saturating_sub(1);
                    self.reply(RESP_UPDATE_NACK);
                } else {
                    self.accepted.push(packet);
                    self.reply(RESP_UPDATE_ACK);
                }
            }
        }
    }
}

impl Transport for SimulatedDevice {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let count = self.accept_limit.map_or(bytes.len(), |l| l.min(bytes.len()));
        for &byte in &bytes[..count] {
            self.written.push(byte);
            self.receive(byte);
        }
        Ok(count)
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        if self.streaming {
            self.rx.push_back(RESP_SYNC_START);
        }
        Ok(self.rx.len())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.clears += 1;
        self.rx.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pad_proto::handshake::FLUSH_SEQUENCE;

    #[test]
    fn test_flush_from_power_up_echoes_each_byte() {
        let mut device = SimulatedDevice::new();
        device.write(&FLUSH_SEQUENCE).unwrap();
        assert_eq!(device.bytes_available().unwrap(), FRAME_LEN);
        assert_eq!(device.state(), DeviceState::SyncStart);
    }

    #[test]
    fn test_flush_while_synced_replies_once() {
        let mut device = SimulatedDevice::synced();
        device.write(&FLUSH_SEQUENCE).unwrap();
        assert_eq!(device.bytes_available().unwrap(), 1);
        assert_eq!(device.state(), DeviceState::SyncStart);
    }

    #[test]
    fn test_flush_trailer_follows_each_answer() {
        let mut device = SimulatedDevice::synced().with_flush_trailer(0x5A);
        device.write(&FLUSH_SEQUENCE).unwrap();

        let mut replies = [0u8; 4];
        assert_eq!(device.read(&mut replies, Duration::ZERO).unwrap(), 2);
        assert_eq!(replies[..2], [RESP_SYNC_START, 0x5A]);
    }

    #[test]
    fn test_frame_ack_and_nack() {
        let mut device = SimulatedDevice::synced().reject_frames(1);
        let packet = ReportPacket::neutral();
        device.write(packet.as_bytes()).unwrap();
        device.write(packet.as_bytes()).unwrap();

        let mut replies = [0u8; 2];
        assert_eq!(device.read(&mut replies, Duration::ZERO).unwrap(), 2);
        assert_eq!(replies, [RESP_UPDATE_NACK, RESP_UPDATE_ACK]);
        assert_eq!(device.accepted(), &[packet]);
        assert_eq!(device.frames_seen(), 2);
    }

    #[test]
    fn test_corrupt_frame_nacked() {
        let mut device = SimulatedDevice::synced();
        let mut bytes = *ReportPacket::neutral().as_bytes();
        bytes[8] ^= 0x01;
        device.write(&bytes).unwrap();
        assert_eq!(device.rx.pop_front(), Some(RESP_UPDATE_NACK));
        assert!(device.accepted().is_empty());
    }
}
