//! Command encoding and report framing for the serial controller link.
//!
//! This crate holds everything about the link that is pure data:
//!
//! - **Types**: host-side controller state
//!   - [`Buttons`] - Button bitfield (14 buttons)
//!   - [`Dpad`] - D-pad direction
//!   - [`StickVector`] - Analog stick as angle + intensity
//!   - [`LogicalCommand`] - Bit-packed complete controller state
//!
//! - **Codec**: [`encode()`] turns a [`LogicalCommand`] into device-native
//!   [`PacketFields`] (device D-pad code, stick X/Y bytes)
//!
//! - **Framing**: [`ReportPacket`] appends the CRC-8 checksum,
//!   [`parse_ack()`] classifies the device's reply
//!
//! - **Building**: [`CommandBuilder`] - Fluent builder API
//!
//! # Protocol Format
//!
//! Every command is a 9-byte frame:
//!
//! ```text
//! [buttons_high, buttons_low, dpad, lx, ly, rx, ry, 0x00, crc8]
//! ```
//!
//! - `buttons_*` - 16-bit button bitfield, high byte first
//! - `dpad` - Device D-pad code, 0x00 (up) clockwise to 0x07, 0x08 centered
//! - `lx,ly,rx,ry` - Stick axes, 128 centered, Y grows downward
//! - `crc8` - CRC-8/SMBUS of the 8 payload bytes
//!
//! The device answers each frame with 0x91 (ACK) or 0x92 (NACK). The
//! handshake bytes that re-align framing are in [`handshake`].
//!
//! # Example
//!
//! ```
//! use pad_proto::{parse_ack, AckResult, LogicalCommand, ReportPacket};
//!
//! let cmd = LogicalCommand::B | LogicalCommand::DPAD_DOWN | LogicalCommand::RSTICK_LEFT;
//! let packet = ReportPacket::from_command(cmd);
//! assert_eq!(packet.as_bytes()[..3], [0x00, 0x02, 0x04]);
//!
//! assert_eq!(parse_ack(0x91), AckResult::Acknowledged);
//! ```
//!
//! # Features
//!
//! - **`std`**: Use the standard library's trigonometry (otherwise `libm`)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod codec;
pub mod crc;
pub mod frame;
pub mod handshake;
pub mod types;

// Re-export types at crate root for convenience
pub use builder::CommandBuilder;
pub use codec::{dpad_code, encode, stick_axes, PacketFields, STICK_CENTER};
pub use crc::{checksum8, Crc8Digest};
pub use frame::{
    parse_ack, AckResult, FrameError, ReportPacket, FRAME_LEN, PAYLOAD_LEN, RESP_UPDATE_ACK,
    RESP_UPDATE_NACK,
};
pub use types::{Buttons, CommandError, Dpad, LogicalCommand, StickVector};
