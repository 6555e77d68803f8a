pub mod expander_adapter;
pub mod standard;

use embedded_hal::{delay::DelayNs, i2c};

use crate::CharacterDisplayError;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// How a value handed to `DeviceHardwareTrait::send` reaches the HD44780.
pub enum SendMode {
    /// Full byte to the instruction register (RS low)
    Command,
    /// Full byte to the data register (RS high). Carriage return and line feed are dropped.
    Data,
    /// Full byte to the data register without the line terminator filter. Used for CGRAM
    /// glyph rows, where `0x0A` and `0x0D` are ordinary bit patterns.
    RawData,
    /// Only the low nibble, RS low. Used by the 4-bit wake-up sequence.
    Nibble,
}

/// Trait for device hardware implementations. Embodies the transport below the HD44780 command
/// set: getting a command or data byte onto the LCD lines and switching the backlight. The
/// HD44780 command sequencer in `standard` is written against this trait only.
pub trait DeviceHardwareTrait<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Prepares the hardware beneath the LCD. Called once, before the HD44780 init sequence.
    fn init(&mut self) -> Result<(), CharacterDisplayError<I2C>>;

    /// Pushes one value to the LCD controller.
    fn send(&mut self, value: u8, mode: SendMode) -> Result<(), CharacterDisplayError<I2C>>;

    /// Turns the backlight on or off, if the hardware can.
    fn set_backlight(&mut self, on: bool) -> Result<(), CharacterDisplayError<I2C>>;

    /// return a mutable reference to the delay object
    fn delay(&mut self) -> &mut DELAY;

    /// returns the i2c object. mostly used for testing
    fn i2c(&mut self) -> &mut I2C;
}
