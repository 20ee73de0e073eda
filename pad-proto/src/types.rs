//! Core command types: Buttons, Dpad, StickVector, LogicalCommand.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Highest angle value that fits the 12-bit angle field.
pub const MAX_STICK_ANGLE: u16 = 0x0FFF;

/// Mask of the 14 buttons the device reports.
pub const BUTTON_MASK: u16 = 0x3FFF;

/// Error type for building commands from raw field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Button bits outside the 14 reported buttons were set.
    InvalidButtons(u16),
    /// D-pad bits are not one of the 9 legal direction combinations.
    InvalidDpad(u8),
    /// Stick angle does not fit the 12-bit angle field.
    AngleOutOfRange(u16),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidButtons(bits) => write!(f, "invalid button bits {bits:#06x}"),
            Self::InvalidDpad(bits) => write!(f, "invalid d-pad direction bits {bits:#04x}"),
            Self::AngleOutOfRange(angle) => write!(f, "stick angle {angle} exceeds 4095"),
        }
    }
}

/// Button state represented as a bitfield.
///
/// Bit positions match the device's report layout.
///
/// # Example
///
/// ```
/// use pad_proto::Buttons;
///
/// let buttons = Buttons::A | Buttons::ZR;
/// assert!(buttons.contains(Buttons::A));
/// assert!(!buttons.contains(Buttons::B));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(u16);

impl Buttons {
    pub const Y: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const A: Self = Self(1 << 2);
    pub const X: Self = Self(1 << 3);
    pub const L: Self = Self(1 << 4);
    pub const R: Self = Self(1 << 5);
    pub const ZL: Self = Self(1 << 6);
    pub const ZR: Self = Self(1 << 7);
    pub const MINUS: Self = Self(1 << 8);
    pub const PLUS: Self = Self(1 << 9);
    pub const LCLICK: Self = Self(1 << 10); // Left stick press
    pub const RCLICK: Self = Self(1 << 11); // Right stick press
    pub const HOME: Self = Self(1 << 12);
    pub const CAPTURE: Self = Self(1 << 13);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Every reported button, in bit order.
    pub const ALL: [Self; 14] = [
        Self::Y,
        Self::B,
        Self::A,
        Self::X,
        Self::L,
        Self::R,
        Self::ZL,
        Self::ZR,
        Self::MINUS,
        Self::PLUS,
        Self::LCLICK,
        Self::RCLICK,
        Self::HOME,
        Self::CAPTURE,
    ];

    /// Build from raw bits, rejecting bits outside the 14 reported buttons.
    pub const fn from_bits(bits: u16) -> Result<Self, CommandError> {
        if bits & !BUTTON_MASK != 0 {
            return Err(CommandError::InvalidButtons(bits));
        }
        Ok(Self(bits))
    }

    /// Build from raw bits without validation.
    ///
    /// Used when decomposing a raw command, where the top two bits are carried
    /// through unchanged to the wire.
    #[inline]
    #[must_use]
    pub const fn from_bits_retain(bits: u16) -> Self {
        Self(bits)
    }

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw u16 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    /// Complement within the 14 reported buttons.
    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0 & BUTTON_MASK)
    }
}

/// D-pad direction.
///
/// Host-side directions are composed from four orthogonal bits
/// ([`Dpad::UP_BIT`] and friends); diagonals are the union of two of them.
/// The device expects its own 4-bit code instead, see [`Dpad::device_code`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dpad {
    #[default]
    Center,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Dpad {
    pub const UP_BIT: u8 = 0x01;
    pub const RIGHT_BIT: u8 = 0x02;
    pub const DOWN_BIT: u8 = 0x04;
    pub const LEFT_BIT: u8 = 0x08;

    /// Device code for a centered D-pad.
    pub const CENTER_CODE: u8 = 0x08;

    /// All nine legal directions.
    pub const ALL: [Self; 9] = [
        Self::Center,
        Self::Up,
        Self::UpRight,
        Self::Right,
        Self::DownRight,
        Self::Down,
        Self::DownLeft,
        Self::Left,
        Self::UpLeft,
    ];

    /// Host-side direction bits for this direction.
    #[must_use]
    pub const fn direction_bits(self) -> u8 {
        match self {
            Self::Center => 0,
            Self::Up => Self::UP_BIT,
            Self::UpRight => Self::UP_BIT | Self::RIGHT_BIT,
            Self::Right => Self::RIGHT_BIT,
            Self::DownRight => Self::DOWN_BIT | Self::RIGHT_BIT,
            Self::Down => Self::DOWN_BIT,
            Self::DownLeft => Self::DOWN_BIT | Self::LEFT_BIT,
            Self::Left => Self::LEFT_BIT,
            Self::UpLeft => Self::UP_BIT | Self::LEFT_BIT,
        }
    }

    /// Look up the direction for a host-side bit pattern.
    ///
    /// Returns `None` for opposing or triple combinations.
    #[must_use]
    pub const fn from_direction_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Self::Center,
            0x01 => Self::Up,
            0x03 => Self::UpRight,
            0x02 => Self::Right,
            0x06 => Self::DownRight,
            0x04 => Self::Down,
            0x0C => Self::DownLeft,
            0x08 => Self::Left,
            0x09 => Self::UpLeft,
            _ => return None,
        })
    }

    /// Device-native code: 0x00 (up) clockwise to 0x07 (up-left), 0x08 centered.
    #[must_use]
    pub const fn device_code(self) -> u8 {
        match self {
            Self::Up => 0x00,
            Self::UpRight => 0x01,
            Self::Right => 0x02,
            Self::DownRight => 0x03,
            Self::Down => 0x04,
            Self::DownLeft => 0x05,
            Self::Left => 0x06,
            Self::UpLeft => 0x07,
            Self::Center => Self::CENTER_CODE,
        }
    }
}

/// Analog stick vector as angle (degrees, counter-clockwise from right) and intensity.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickVector {
    angle: u16,
    intensity: u8,
}

impl StickVector {
    /// Stick at rest.
    pub const CENTER: Self = Self::at(0, 0);
    pub const RIGHT: Self = Self::at(0, 0xFF);
    pub const UP_RIGHT: Self = Self::at(45, 0xFF);
    pub const UP: Self = Self::at(90, 0xFF);
    pub const UP_LEFT: Self = Self::at(135, 0xFF);
    pub const LEFT: Self = Self::at(180, 0xFF);
    pub const DOWN_LEFT: Self = Self::at(225, 0xFF);
    pub const DOWN: Self = Self::at(270, 0xFF);
    pub const DOWN_RIGHT: Self = Self::at(315, 0xFF);

    const fn at(angle: u16, intensity: u8) -> Self {
        Self { angle, intensity }
    }

    /// Create a stick vector, rejecting angles that do not fit 12 bits.
    ///
    /// Angles above 360 are accepted (the encoder wraps them through the
    /// trigonometry) as long as they fit the field.
    pub const fn new(angle: u16, intensity: u8) -> Result<Self, CommandError> {
        if angle > MAX_STICK_ANGLE {
            return Err(CommandError::AngleOutOfRange(angle));
        }
        Ok(Self { angle, intensity })
    }

    /// Create a stick vector, wrapping the angle into 0..360.
    #[must_use]
    pub const fn from_degrees(angle: u32, intensity: u8) -> Self {
        Self {
            angle: (angle % 360) as u16,
            intensity,
        }
    }

    #[inline]
    #[must_use]
    pub const fn angle(self) -> u16 {
        self.angle
    }

    #[inline]
    #[must_use]
    pub const fn intensity(self) -> u8 {
        self.intensity
    }

    /// Check if the stick is at rest (zero intensity).
    #[inline]
    #[must_use]
    pub const fn is_centered(self) -> bool {
        self.intensity == 0
    }

    /// The 20-bit field value: intensity in the low byte, angle above it.
    #[inline]
    const fn field(self) -> u64 {
        (self.intensity as u64) | ((self.angle as u64) << 8)
    }

    #[inline]
    const fn from_field(field: u64) -> Self {
        Self {
            intensity: (field & 0xFF) as u8,
            angle: ((field >> 8) & MAX_STICK_ANGLE as u64) as u16,
        }
    }
}

/// Bit-packed host-side controller state.
///
/// Layout, least-significant first:
///
/// | bits  | field                     |
/// |-------|---------------------------|
/// | 0-15  | button mask               |
/// | 16-23 | D-pad direction bits      |
/// | 24-31 | left stick intensity      |
/// | 32-43 | left stick angle          |
/// | 44-51 | right stick intensity     |
/// | 52-63 | right stick angle         |
///
/// Commands compose with `|`:
///
/// ```
/// use pad_proto::LogicalCommand;
///
/// let cmd = LogicalCommand::A | LogicalCommand::DPAD_UP_RIGHT | LogicalCommand::LSTICK_UP;
/// assert_eq!(cmd.raw(), 0x0000_005A_FF03_0004);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalCommand(u64);

const DPAD_SHIFT: u32 = 16;
const LSTICK_SHIFT: u32 = 24;
const RSTICK_SHIFT: u32 = 44;
const STICK_FIELD_MASK: u64 = 0xF_FFFF;

impl LogicalCommand {
    /// No input: no buttons, centered D-pad, both sticks at rest.
    pub const NEUTRAL: Self = Self(0);

    pub const Y: Self = Self::buttons_only(Buttons::Y);
    pub const B: Self = Self::buttons_only(Buttons::B);
    pub const A: Self = Self::buttons_only(Buttons::A);
    pub const X: Self = Self::buttons_only(Buttons::X);
    pub const L: Self = Self::buttons_only(Buttons::L);
    pub const R: Self = Self::buttons_only(Buttons::R);
    pub const ZL: Self = Self::buttons_only(Buttons::ZL);
    pub const ZR: Self = Self::buttons_only(Buttons::ZR);
    pub const MINUS: Self = Self::buttons_only(Buttons::MINUS);
    pub const PLUS: Self = Self::buttons_only(Buttons::PLUS);
    pub const LCLICK: Self = Self::buttons_only(Buttons::LCLICK);
    pub const RCLICK: Self = Self::buttons_only(Buttons::RCLICK);
    pub const HOME: Self = Self::buttons_only(Buttons::HOME);
    pub const CAPTURE: Self = Self::buttons_only(Buttons::CAPTURE);

    pub const DPAD_UP: Self = Self::dpad_only(Dpad::Up);
    pub const DPAD_RIGHT: Self = Self::dpad_only(Dpad::Right);
    pub const DPAD_DOWN: Self = Self::dpad_only(Dpad::Down);
    pub const DPAD_LEFT: Self = Self::dpad_only(Dpad::Left);
    pub const DPAD_UP_RIGHT: Self = Self::dpad_only(Dpad::UpRight);
    pub const DPAD_DOWN_RIGHT: Self = Self::dpad_only(Dpad::DownRight);
    pub const DPAD_UP_LEFT: Self = Self::dpad_only(Dpad::UpLeft);
    pub const DPAD_DOWN_LEFT: Self = Self::dpad_only(Dpad::DownLeft);

    pub const LSTICK_RIGHT: Self = Self::left_stick(StickVector::RIGHT);
    pub const LSTICK_UP_RIGHT: Self = Self::left_stick(StickVector::UP_RIGHT);
    pub const LSTICK_UP: Self = Self::left_stick(StickVector::UP);
    pub const LSTICK_UP_LEFT: Self = Self::left_stick(StickVector::UP_LEFT);
    pub const LSTICK_LEFT: Self = Self::left_stick(StickVector::LEFT);
    pub const LSTICK_DOWN_LEFT: Self = Self::left_stick(StickVector::DOWN_LEFT);
    pub const LSTICK_DOWN: Self = Self::left_stick(StickVector::DOWN);
    pub const LSTICK_DOWN_RIGHT: Self = Self::left_stick(StickVector::DOWN_RIGHT);

    pub const RSTICK_RIGHT: Self = Self::right_stick(StickVector::RIGHT);
    pub const RSTICK_UP_RIGHT: Self = Self::right_stick(StickVector::UP_RIGHT);
    pub const RSTICK_UP: Self = Self::right_stick(StickVector::UP);
    pub const RSTICK_UP_LEFT: Self = Self::right_stick(StickVector::UP_LEFT);
    pub const RSTICK_LEFT: Self = Self::right_stick(StickVector::LEFT);
    pub const RSTICK_DOWN_LEFT: Self = Self::right_stick(StickVector::DOWN_LEFT);
    pub const RSTICK_DOWN: Self = Self::right_stick(StickVector::DOWN);
    pub const RSTICK_DOWN_RIGHT: Self = Self::right_stick(StickVector::DOWN_RIGHT);

    /// Compose a command from its five sub-fields.
    #[must_use]
    pub const fn new(buttons: Buttons, dpad: Dpad, left: StickVector, right: StickVector) -> Self {
        Self::compose(buttons, dpad.direction_bits(), left, right)
    }

    /// Compose a command from raw field values, validating each range.
    pub const fn try_from_fields(
        buttons: u16,
        dpad_bits: u8,
        left: (u16, u8),
        right: (u16, u8),
    ) -> Result<Self, CommandError> {
        let buttons = match Buttons::from_bits(buttons) {
            Ok(b) => b,
            Err(e) => return Err(e),
        };
        let dpad = match Dpad::from_direction_bits(dpad_bits) {
            Some(d) => d,
            None => return Err(CommandError::InvalidDpad(dpad_bits)),
        };
        let left = match StickVector::new(left.0, left.1) {
            Ok(s) => s,
            Err(e) => return Err(e),
        };
        let right = match StickVector::new(right.0, right.1) {
            Ok(s) => s,
            Err(e) => return Err(e),
        };
        Ok(Self::new(buttons, dpad, left, right))
    }

    /// Compose without validating the D-pad bits.
    #[must_use]
    pub const fn compose(
        buttons: Buttons,
        dpad_bits: u8,
        left: StickVector,
        right: StickVector,
    ) -> Self {
        Self(
            buttons.raw() as u64
                | (dpad_bits as u64) << DPAD_SHIFT
                | left.field() << LSTICK_SHIFT
                | right.field() << RSTICK_SHIFT,
        )
    }

    /// Wrap a raw 64-bit command value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Raw-bit contribution of a left stick vector.
    #[must_use]
    pub const fn left_stick(stick: StickVector) -> Self {
        Self(stick.field() << LSTICK_SHIFT)
    }

    /// Raw-bit contribution of a right stick vector.
    #[must_use]
    pub const fn right_stick(stick: StickVector) -> Self {
        Self(stick.field() << RSTICK_SHIFT)
    }

    const fn buttons_only(buttons: Buttons) -> Self {
        Self(buttons.raw() as u64)
    }

    const fn dpad_only(dpad: Dpad) -> Self {
        Self((dpad.direction_bits() as u64) << DPAD_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn buttons(self) -> Buttons {
        Buttons::from_bits_retain(self.0 as u16)
    }

    /// Raw D-pad direction bits (bits 16-23).
    #[inline]
    #[must_use]
    pub const fn dpad_bits(self) -> u8 {
        (self.0 >> DPAD_SHIFT) as u8
    }

    /// D-pad direction, or `None` if the bits are not a legal combination.
    #[inline]
    #[must_use]
    pub const fn dpad(self) -> Option<Dpad> {
        Dpad::from_direction_bits(self.dpad_bits())
    }

    #[inline]
    #[must_use]
    pub const fn left(self) -> StickVector {
        StickVector::from_field((self.0 >> LSTICK_SHIFT) & STICK_FIELD_MASK)
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> StickVector {
        StickVector::from_field((self.0 >> RSTICK_SHIFT) & STICK_FIELD_MASK)
    }
}

impl From<u64> for LogicalCommand {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<LogicalCommand> for u64 {
    fn from(cmd: LogicalCommand) -> Self {
        cmd.0
    }
}

impl BitOr for LogicalCommand {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LogicalCommand {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for LogicalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalCommand({:#018x})", self.0)
    }
}
