//! Translation between [`LogicalCommand`] values and device report fields.

use crate::types::{Dpad, LogicalCommand, StickVector};

/// Stick axis value at rest.
pub const STICK_CENTER: u8 = 0x80;

/// Maximum axis deflection from center.
const STICK_RANGE: f64 = 127.0;

/// Device-native report fields for one command, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketFields {
    pub buttons_high: u8,
    pub buttons_low: u8,
    pub dpad: u8,
    pub left_x: u8,
    pub left_y: u8,
    pub right_x: u8,
    pub right_y: u8,
}

impl PacketFields {
    /// Fields of the neutral report: no buttons, centered D-pad and sticks.
    pub const NEUTRAL: Self = Self {
        buttons_high: 0,
        buttons_low: 0,
        dpad: Dpad::CENTER_CODE,
        left_x: STICK_CENTER,
        left_y: STICK_CENTER,
        right_x: STICK_CENTER,
        right_y: STICK_CENTER,
    };
}

impl Default for PacketFields {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Encode a logical command into device report fields.
///
/// # Example
///
/// ```
/// use pad_proto::{encode, LogicalCommand};
///
/// let cmd = LogicalCommand::A | LogicalCommand::DPAD_UP_RIGHT | LogicalCommand::LSTICK_UP;
/// let fields = encode(cmd);
/// assert_eq!(fields.buttons_low, 0x04);
/// assert_eq!(fields.dpad, 0x01);
/// assert_eq!((fields.left_x, fields.left_y), (128, 1));
/// ```
#[must_use]
pub fn encode(cmd: LogicalCommand) -> PacketFields {
    let buttons = cmd.buttons().raw();
    let (left_x, left_y) = stick_axes(cmd.left());
    let (right_x, right_y) = stick_axes(cmd.right());

    PacketFields {
        buttons_high: (buttons >> 8) as u8,
        buttons_low: buttons as u8,
        dpad: dpad_code(cmd.dpad_bits()),
        left_x,
        left_y,
        right_x,
        right_y,
    }
}

/// Map host-side D-pad direction bits to the device-native code.
///
/// Bit patterns that are not one of the nine legal directions fall back to
/// the centered code.
#[inline]
#[must_use]
pub fn dpad_code(direction_bits: u8) -> u8 {
    Dpad::from_direction_bits(direction_bits).map_or(Dpad::CENTER_CODE, Dpad::device_code)
}

/// Convert a stick vector to X/Y axis bytes.
///
/// Each axis is `trunc(trig(angle) * 127 * intensity / 255)` offset from 128,
/// truncated toward zero. Y is inverted because the device's vertical axis
/// grows downward.
#[must_use]
pub fn stick_axes(stick: StickVector) -> (u8, u8) {
    if stick.is_centered() {
        return (STICK_CENTER, STICK_CENTER);
    }

    let radians = f64::from(stick.angle()).to_radians();
    let intensity = f64::from(stick.intensity());
    let dx = (cos(radians) * STICK_RANGE) * intensity / 255.0;
    let dy = (sin(radians) * STICK_RANGE) * intensity / 255.0;

    // `as i32` truncates toward zero
    let x = dx as i32 + i32::from(STICK_CENTER);
    let y = -(dy as i32) + i32::from(STICK_CENTER);
    (clamp_u8(x), clamp_u8(y))
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 0xFF) as u8
}

#[cfg(feature = "std")]
#[inline]
fn cos(x: f64) -> f64 {
    x.cos()
}

#[cfg(feature = "std")]
#[inline]
fn sin(x: f64) -> f64 {
    x.sin()
}

#[cfg(not(feature = "std"))]
#[inline]
fn cos(x: f64) -> f64 {
    libm::cos(x)
}

#[cfg(not(feature = "std"))]
#[inline]
fn sin(x: f64) -> f64 {
    libm::sin(x)
}
