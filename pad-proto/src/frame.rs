//! 9-byte report framing and acknowledgement classification.
//!
//! # Wire Format
//!
//! ```text
//! [buttons_high, buttons_low, dpad, lx, ly, rx, ry, 0x00, crc8]
//! ```
//!
//! After each frame the device answers with a single byte:
//! [`RESP_UPDATE_ACK`] if the checksum matched, [`RESP_UPDATE_NACK`] otherwise.

use core::fmt;

use crate::codec::{encode, PacketFields};
use crate::crc::{checksum8, Crc8Digest};
use crate::types::LogicalCommand;

/// Payload bytes per frame, excluding the checksum.
pub const PAYLOAD_LEN: usize = 8;

/// Bytes per frame on the wire.
pub const FRAME_LEN: usize = PAYLOAD_LEN + 1;

/// Value of the reserved (vendor-specific) payload byte.
pub const RESERVED: u8 = 0x00;

/// Device accepted the frame.
pub const RESP_UPDATE_ACK: u8 = 0x91;

/// Device rejected the frame (checksum mismatch).
pub const RESP_UPDATE_NACK: u8 = 0x92;

/// Classification of the byte the device sends after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckResult {
    Acknowledged,
    NotAcknowledged,
    Unexpected(u8),
}

impl AckResult {
    #[inline]
    #[must_use]
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::Acknowledged)
    }
}

/// Classify a response byte.
#[inline]
#[must_use]
pub const fn parse_ack(byte: u8) -> AckResult {
    match byte {
        RESP_UPDATE_ACK => AckResult::Acknowledged,
        RESP_UPDATE_NACK => AckResult::NotAcknowledged,
        other => AckResult::Unexpected(other),
    }
}

/// Error type for frame validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Trailing byte does not match the payload checksum.
    Checksum { expected: u8, received: u8 },
    /// Slice is not exactly [`FRAME_LEN`] bytes long.
    Length(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checksum { expected, received } => write!(
                f,
                "checksum mismatch: expected {expected:#04x}, received {received:#04x}"
            ),
            Self::Length(len) => write!(f, "frame must be {FRAME_LEN} bytes, got {len}"),
        }
    }
}

/// A framed report: 8 payload bytes plus checksum.
///
/// The checksum is computed once at construction; the packet is immutable
/// afterwards.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct ReportPacket {
    bytes: [u8; FRAME_LEN],
}

impl ReportPacket {
    /// Frame report fields, appending the checksum.
    pub fn frame(fields: PacketFields) -> Self {
        let payload = [
            fields.buttons_high,
            fields.buttons_low,
            fields.dpad,
            fields.left_x,
            fields.left_y,
            fields.right_x,
            fields.right_y,
            RESERVED,
        ];

        let mut bytes = [0u8; FRAME_LEN];
        bytes[..PAYLOAD_LEN].copy_from_slice(&payload);
        bytes[PAYLOAD_LEN] = checksum8(&payload);
        Self { bytes }
    }

    /// Encode and frame a logical command.
    ///
    /// # Example
    ///
    /// ```
    /// use pad_proto::{LogicalCommand, ReportPacket};
    ///
    /// let packet = ReportPacket::from_command(LogicalCommand::NEUTRAL);
    /// assert_eq!(
    ///     packet.as_bytes(),
    ///     &[0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00, 0x54]
    /// );
    /// ```
    pub fn from_command(cmd: LogicalCommand) -> Self {
        Self::frame(encode(cmd))
    }

    /// The neutral frame: no input.
    pub fn neutral() -> Self {
        Self::frame(PacketFields::NEUTRAL)
    }

    /// Validate a received frame.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, FrameError> {
        let bytes: [u8; FRAME_LEN] = bytes
            .try_into()
            .map_err(|_| FrameError::Length(bytes.len()))?;

        let mut digest = Crc8Digest::new();
        digest.update_slice(&bytes[..PAYLOAD_LEN]);
        let expected = digest.finalize();
        let received = bytes[PAYLOAD_LEN];
        if expected != received {
            return Err(FrameError::Checksum { expected, received });
        }

        Ok(Self { bytes })
    }

    /// The full 9-byte frame.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// The 8 payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[..PAYLOAD_LEN]
    }

    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.bytes[PAYLOAD_LEN]
    }

    /// Report fields carried by this frame.
    #[must_use]
    pub const fn fields(&self) -> PacketFields {
        PacketFields {
            buttons_high: self.bytes[0],
            buttons_low: self.bytes[1],
            dpad: self.bytes[2],
            left_x: self.bytes[3],
            left_y: self.bytes[4],
            right_x: self.bytes[5],
            right_y: self.bytes[6],
        }
    }
}

impl AsRef<[u8]> for ReportPacket {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ReportPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportPacket({:02X?})", self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_frame() {
        let packet = ReportPacket::neutral();
        assert_eq!(
            packet.as_bytes(),
            &[0x00, 0x00, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00, 0x54]
        );
        assert_eq!(packet, ReportPacket::from_command(LogicalCommand::NEUTRAL));
    }

    #[test]
    fn test_checksum_covers_payload() {
        let packet = ReportPacket::from_command(LogicalCommand::A | LogicalCommand::HOME);
        assert_eq!(packet.checksum(), checksum8(packet.payload()));
        assert_eq!(packet.payload()[7], RESERVED);
    }

    #[test]
    fn test_combined_command_frame() {
        let cmd = LogicalCommand::A
            | LogicalCommand::DPAD_UP_RIGHT
            | LogicalCommand::LSTICK_UP
            | LogicalCommand::RSTICK_DOWN_LEFT;
        let packet = ReportPacket::from_command(cmd);
        assert_eq!(
            packet.as_bytes(),
            &[0x00, 0x04, 0x01, 0x80, 0x01, 0x27, 0xD9, 0x00, 0x8F]
        );
    }

    #[test]
    fn test_from_wire_accepts_valid_frame() {
        let packet = ReportPacket::from_command(LogicalCommand::ZR | LogicalCommand::RSTICK_UP);
        let parsed = ReportPacket::from_wire(packet.as_bytes()).unwrap();
        assert_eq!(parsed.fields(), packet.fields());
    }

    #[test]
    fn test_from_wire_rejects_bad_checksum() {
        let mut bytes = *ReportPacket::neutral().as_bytes();
        bytes[8] = 0xFF;
        assert_eq!(
            ReportPacket::from_wire(&bytes),
            Err(FrameError::Checksum {
                expected: 0x54,
                received: 0xFF
            })
        );
    }

    #[test]
    fn test_from_wire_rejects_bad_length() {
        assert_eq!(
            ReportPacket::from_wire(&[0u8; 8]),
            Err(FrameError::Length(8))
        );
    }

    #[test]
    fn test_parse_ack() {
        assert_eq!(parse_ack(0x91), AckResult::Acknowledged);
        assert_eq!(parse_ack(0x92), AckResult::NotAcknowledged);
        assert_eq!(parse_ack(0xFF), AckResult::Unexpected(0xFF));
        assert_eq!(parse_ack(0x00), AckResult::Unexpected(0x00));
        assert!(parse_ack(0x91).is_ack());
        assert!(!parse_ack(0x90).is_ack());
    }
}
