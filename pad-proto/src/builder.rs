//! Builder API for composing logical commands.
//!
//! # Example
//!
//! ```
//! use pad_proto::{Buttons, CommandBuilder, Dpad, LogicalCommand, StickVector};
//!
//! let cmd = CommandBuilder::new()
//!     .press(Buttons::A | Buttons::B)
//!     .dpad(Dpad::Left)
//!     .left_stick(StickVector::UP)
//!     .release(Buttons::B)
//!     .build();
//!
//! assert_eq!(cmd, LogicalCommand::A | LogicalCommand::DPAD_LEFT | LogicalCommand::LSTICK_UP);
//!
//! let packet = CommandBuilder::new().press(Buttons::HOME).frame();
//! assert_eq!(packet.as_bytes()[0], 0x10);
//! ```

use crate::frame::ReportPacket;
use crate::types::{Buttons, CommandError, Dpad, LogicalCommand, StickVector, BUTTON_MASK};

/// Builder for [`LogicalCommand`] values.
///
/// Starts from the neutral command. Every setter takes already-validated
/// parts, so [`build`](Self::build) cannot fail; the `try_*` setters accept
/// raw values and report out-of-range input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct CommandBuilder {
    buttons: Buttons,
    dpad: Dpad,
    left: StickVector,
    right: StickVector,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing command.
    ///
    /// Illegal D-pad bits in `cmd` are replaced by [`Dpad::Center`], which is
    /// how the encoder would have treated them. Button bits above the 14
    /// reported buttons are dropped.
    pub fn from_command(cmd: LogicalCommand) -> Self {
        Self {
            buttons: Buttons::from_bits_retain(cmd.buttons().raw() & BUTTON_MASK),
            dpad: cmd.dpad().unwrap_or_default(),
            left: cmd.left(),
            right: cmd.right(),
        }
    }

    /// Press button(s), keeping the others.
    pub fn press(mut self, buttons: Buttons) -> Self {
        self.buttons |= buttons;
        self
    }

    /// Release button(s), keeping the others.
    pub fn release(mut self, buttons: Buttons) -> Self {
        self.buttons.set(buttons, false);
        self
    }

    /// Replace the whole button state.
    pub fn buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Replace the button state from raw bits.
    pub fn try_buttons(self, bits: u16) -> Result<Self, CommandError> {
        Ok(self.buttons(Buttons::from_bits(bits)?))
    }

    pub fn dpad(mut self, dpad: Dpad) -> Self {
        self.dpad = dpad;
        self
    }

    /// Set the D-pad from host-side direction bits.
    pub fn try_dpad_bits(self, bits: u8) -> Result<Self, CommandError> {
        let dpad = Dpad::from_direction_bits(bits).ok_or(CommandError::InvalidDpad(bits))?;
        Ok(self.dpad(dpad))
    }

    pub fn left_stick(mut self, stick: StickVector) -> Self {
        self.left = stick;
        self
    }

    pub fn right_stick(mut self, stick: StickVector) -> Self {
        self.right = stick;
        self
    }

    /// Set the left stick from an angle in degrees and an intensity.
    pub fn try_left_stick(self, angle: u16, intensity: u8) -> Result<Self, CommandError> {
        Ok(self.left_stick(StickVector::new(angle, intensity)?))
    }

    /// Set the right stick from an angle in degrees and an intensity.
    pub fn try_right_stick(self, angle: u16, intensity: u8) -> Result<Self, CommandError> {
        Ok(self.right_stick(StickVector::new(angle, intensity)?))
    }

    /// Return both sticks to rest.
    pub fn center_sticks(mut self) -> Self {
        self.left = StickVector::CENTER;
        self.right = StickVector::CENTER;
        self
    }

    #[must_use]
    pub fn build(self) -> LogicalCommand {
        LogicalCommand::new(self.buttons, self.dpad, self.left, self.right)
    }

    /// Build, encode and frame the command.
    pub fn frame(self) -> ReportPacket {
        ReportPacket::from_command(self.build())
    }
}

impl From<CommandBuilder> for LogicalCommand {
    fn from(builder: CommandBuilder) -> Self {
        builder.build()
    }
}
