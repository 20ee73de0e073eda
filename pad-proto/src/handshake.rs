//! Handshake sentinels.
//!
//! ```text
//! host                          device
//!  | -- 0xFF x 9 (flush) ------> |
//!  | <----------- 0xFF (ready) - |
//!  | -- 0x33 (sync 1) ---------> |
//!  | <------------ 0xCC -------- |
//!  | -- 0xCC (sync 2) ---------> |
//!  | <------------ 0x33 (ok) --- |
//! ```
//!
//! The flush is as long as a frame, so a device stuck mid-frame completes
//! that frame with a failing checksum on a 0xFF byte, which drops it back
//! into its sync-start state.

use crate::frame::FRAME_LEN;

/// Flush byte; also asks an out-of-sync device to start synchronizing.
pub const COMMAND_SYNC_START: u8 = 0xFF;
pub const COMMAND_SYNC_1: u8 = 0x33;
pub const COMMAND_SYNC_2: u8 = 0xCC;

/// Device is ready to synchronize.
pub const RESP_SYNC_START: u8 = 0xFF;
pub const RESP_SYNC_1: u8 = 0xCC;
pub const RESP_SYNC_OK: u8 = 0x33;

/// Length of the flush sequence.
pub const FLUSH_LEN: usize = FRAME_LEN;

/// Bytes written to re-align the device's receiver.
pub const FLUSH_SEQUENCE: [u8; FLUSH_LEN] = [COMMAND_SYNC_START; FLUSH_LEN];
