//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display wired to an 8-bit I2C GPIO expander, in an embedded, `no_std` environment. Two expander
//! families are supported:
//!
//! - **PCF8574 / PCF8574A** - the chip found on nearly every cheap "I2C LCD backpack". It has no registers; the byte written
//!   to it appears directly on its 8 pins.
//! - **MCP23008** - used on the [Adafruit I2C/SPI LCD Backpack](https://www.adafruit.com/product/292). Its pins are driven
//!   through the OLAT register and it needs its direction register set up before use.
//!
//! Backpack makers wire the LCD lines to the expander pins in different orders, so the wiring is described with a
//! [`PinMap`]. Presets for common boards are available through [`Board`].
//!
//! Key features include:
//! - Any wiring of the LCD enable, RW, RS and D4..D7 lines, plus an optional backlight pin of either polarity
//! - Automatic detection of the expander chip type and, optionally, of its bus address
//! - Convenient high-level API for controlling the display
//! - Support for custom characters
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! i2c-expander-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which allows the library's errors to be used with the `defmt` logging
//! framework. Another optional feature is `features = ["ufmt"]`, which enables the `ufmt` feature, allowing the `uwriteln!` and `uwrite!` macros to be used.
//!
//! Then describe the backpack:
//! ```rust
//! use i2c_expander_lcd::{Board, ChipType, ExpanderCharacterDisplay, PinMap, BacklightPolarity};
//!
//! // board setup
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // a known board at a known address
//! let mut lcd = ExpanderCharacterDisplay::from_board(i2c, delay, Some(0x27), Board::YwRobot);
//! // custom wiring, chip type and address discovered at `begin`
//! let pins = PinMap::new(6, 5, 4, 0, 1, 2, 3)?.with_backlight(7, BacklightPolarity::Negative)?;
//! let mut lcd = ExpanderCharacterDisplay::new(i2c, delay, None, ChipType::Unknown, pins);
//! ```
//! Passing `None` as the address scans the bus for the first device that identifies as a supported expander. The scan and
//! the chip identification both write to the devices they probe, so only rely on them when the expander is the only device
//! on the bus.
//!
//! Initialize the display:
//! ```rust
//! if let Err(e) = lcd.begin(16, 2, CharacterSize::Dots5x8) {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! If `begin` cannot find or identify the expander it returns an error and the display stays inert: later calls succeed
//! without touching the bus. `is_ready()` reports which case applies.
//!
//! Use the display:
//! ```rust
//! lcd.clear()?.home()?;
//! lcd.print("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "Hello, world!")?;
//! ```
//! The optional `ufmt` feature enables the `ufmt` crate, which allows the `uwriteln!` and `uwrite!` macros to be used with the display:
//! ```rust
//! use ufmt::uwriteln;
//!
//! uwriteln!(lcd, "Hello, world!")?;
//! ```
//!
//! The various methods for controlling the LCD are also available. Each returns a `Result` that wraps the display object in `Ok()`, allowing for easy chaining
//! of commands. For example:
//! ```rust
//! lcd.backlight(true)?.clear()?.set_cursor(0, 1)?.print("Hello, world!")?;
//! ```
//!
//! ### Using the expander directly
//! The [`Expander`] type is the register-level layer beneath the display and can drive spare expander pins on its own
//! through `pin_mode`, `digital_write` and `digital_read`. [`identify_chip`] and [`locate_device`] expose the chip probe
//! and the bus scan.
//!
#![no_std]
#![allow(dead_code, non_camel_case_types, non_upper_case_globals)]
use core::fmt::Display;

use embedded_hal::{delay::DelayNs, i2c};

pub mod adapter_config;
mod driver;
pub mod expander;

pub use adapter_config::{boards::Board, BacklightPolarity, PinMap, PinMapError};
pub use expander::{identify_chip, locate_device, ChipType, Direction, Expander, ExpanderError};

use driver::{
    expander_adapter::ExpanderLcdAdapter, standard::StandardCharacterDisplayHandler,
    DeviceHardwareTrait,
};

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the display
pub enum CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    /// I2C error returned from the underlying I2C implementation
    I2cError(I2C::Error),
    /// No supported expander found on the bus
    AddressNotFound,
    /// The device at the address is neither a PCF8574 nor an MCP23008
    UnknownChipType,
    /// The expander was used before its address and chip type were resolved
    Unresolved,
    /// The configured address is not a 7-bit address
    InvalidAddress,
    /// Expander pin is out of range
    PinOutOfRange,
    /// Too many bytes for one bus transaction
    BufferTooSmall,
    /// The pin map is invalid
    InvalidPinMap(PinMapError),
    /// Row is out of range
    RowOutOfRange,
    /// Column is out of range
    ColumnOutOfRange,
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<I2C> From<core::fmt::Error> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: core::fmt::Error) -> Self {
        CharacterDisplayError::FormattingError(err)
    }
}

impl<I2C> From<PinMapError> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: PinMapError) -> Self {
        CharacterDisplayError::InvalidPinMap(err)
    }
}

impl<I2C> From<ExpanderError<I2C>> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: ExpanderError<I2C>) -> Self {
        match err {
            ExpanderError::AddressNotFound => CharacterDisplayError::AddressNotFound,
            ExpanderError::UnknownChipType => CharacterDisplayError::UnknownChipType,
            ExpanderError::Unresolved => CharacterDisplayError::Unresolved,
            ExpanderError::InvalidAddress => CharacterDisplayError::InvalidAddress,
            ExpanderError::PinOutOfRange => CharacterDisplayError::PinOutOfRange,
            ExpanderError::BufferTooSmall => CharacterDisplayError::BufferTooSmall,
            ExpanderError::I2cError(e) => CharacterDisplayError::I2cError(e),
        }
    }
}

impl<I2C> From<&CharacterDisplayError<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &CharacterDisplayError<I2C>) -> Self {
        match err {
            CharacterDisplayError::I2cError(_) => "I2C error",
            CharacterDisplayError::AddressNotFound => "Expander address not found",
            CharacterDisplayError::UnknownChipType => "Unknown expander chip type",
            CharacterDisplayError::Unresolved => "Expander not resolved",
            CharacterDisplayError::InvalidAddress => "Invalid I2C address",
            CharacterDisplayError::PinOutOfRange => "Pin out of range",
            CharacterDisplayError::BufferTooSmall => "Buffer too small",
            CharacterDisplayError::InvalidPinMap(_) => "Invalid pin map",
            CharacterDisplayError::RowOutOfRange => "Row out of range",
            CharacterDisplayError::ColumnOutOfRange => "Column out of range",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<I2C> Display for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Character cell height. The 10 dot font is only honored on single line displays.
pub enum CharacterSize {
    Dots5x8,
    Dots5x10,
}

pub struct DeviceSetupConfig<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    i2c: I2C,
    delay: DELAY,
}

/// HD44780 character display behind a PCF8574 or MCP23008 GPIO expander.
pub struct ExpanderCharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    device: ExpanderLcdAdapter<I2C, DELAY>,
    actions: StandardCharacterDisplayHandler<I2C, DELAY, ExpanderLcdAdapter<I2C, DELAY>>,
}

impl<I2C, DELAY> ExpanderCharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Create a new character display object. `address` of `None` scans the bus at `begin`, and
    /// `ChipType::Unknown` identifies the chip at `begin`. Nothing is sent to the bus here.
    pub fn new(
        i2c: I2C,
        delay: DELAY,
        address: Option<u8>,
        chip: ChipType,
        pin_map: PinMap,
    ) -> Self {
        Self {
            device: ExpanderLcdAdapter::new(
                DeviceSetupConfig { i2c, delay },
                Expander::new(address, chip),
                pin_map,
            ),
            actions: StandardCharacterDisplayHandler::default(),
        }
    }

    /// Create a new character display object for one of the known backpacks.
    pub fn from_board(i2c: I2C, delay: DELAY, address: Option<u8>, board: Board) -> Self {
        Self::new(i2c, delay, address, board.chip_type(), board.pin_map())
    }

    /// Resolve the expander and initialize the display. This must be called before using the
    /// display. On error the display stays inert and every later operation is a no-op.
    pub fn begin(
        &mut self,
        cols: u8,
        rows: u8,
        char_size: CharacterSize,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions
            .begin(&mut self.device, cols, rows, char_size)?;
        Ok(self)
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    #[cfg(test)]
    fn i2c(&mut self) -> &mut I2C {
        self.device.i2c()
    }

    /// Give back the I2C peripheral and the delay.
    pub fn release(self) -> (I2C, DELAY) {
        self.device.release()
    }

    /// The expander address, once configured or located.
    pub fn address(&self) -> Option<u8> {
        self.device.expander().address()
    }

    /// The expander chip type, once configured or identified.
    pub fn chip_type(&self) -> ChipType {
        self.device.expander().chip()
    }

    /// Address and chip type are both known, so operations reach the hardware.
    pub fn is_ready(&self) -> bool {
        self.device.expander().is_resolved()
    }

    pub fn expander(&self) -> &Expander {
        self.device.expander()
    }

    pub fn pin_map(&self) -> &PinMap {
        self.device.pin_map()
    }

    pub fn cols(&self) -> u8 {
        self.actions.cols()
    }

    pub fn rows(&self) -> u8 {
        self.actions.rows()
    }

    /// Set the backlight pin and polarity. Only the configuration is recorded; call `backlight`
    /// to apply it.
    pub fn set_backlight_pin(
        &mut self,
        pin: u8,
        polarity: BacklightPolarity,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.set_backlight_pin(pin, polarity)?;
        Ok(self)
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Send a raw HD44780 instruction.
    pub fn command(&mut self, value: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.command(&mut self.device, value)?;
        Ok(self)
    }

    /// Clear the display
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.clear(&mut self.device)?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.home(&mut self.device)?;
        Ok(self)
    }

    /// Set the cursor position at specified column and row. Columns and rows are zero-indexed.
    pub fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.set_cursor(&mut self.device, col, row)?;
        Ok(self)
    }

    /// Set the cursor visibility.
    pub fn show_cursor(
        &mut self,
        show_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.show_cursor(&mut self.device, show_cursor)?;
        Ok(self)
    }

    /// Set the cursor blinking.
    pub fn blink_cursor(
        &mut self,
        blink_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.blink_cursor(&mut self.device, blink_cursor)?;
        Ok(self)
    }

    /// Set the display visibility.
    pub fn show_display(
        &mut self,
        show_display: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.show_display(&mut self.device, show_display)?;
        Ok(self)
    }

    /// Scroll the display to the left.
    pub fn scroll_display_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.scroll_left(&mut self.device)?;
        Ok(self)
    }

    /// Scroll the display to the right.
    pub fn scroll_display_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.scroll_right(&mut self.device)?;
        Ok(self)
    }

    /// Move the cursor one position to the left.
    pub fn move_cursor_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.move_cursor_left(&mut self.device)?;
        Ok(self)
    }

    /// Move the cursor one position to the right.
    pub fn move_cursor_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.move_cursor_right(&mut self.device)?;
        Ok(self)
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.left_to_right(&mut self.device)?;
        Ok(self)
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.right_to_left(&mut self.device)?;
        Ok(self)
    }

    /// Set the auto scroll mode.
    pub fn autoscroll(
        &mut self,
        autoscroll: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.autoscroll(&mut self.device, autoscroll)?;
        Ok(self)
    }

    /// Create a new custom character in one of the 8 slots. Print it by writing the slot number
    /// as a byte, after setting the cursor position.
    pub fn create_char(
        &mut self,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions
            .create_char(&mut self.device, location, charmap)?;
        Ok(self)
    }

    /// Prints a string to the LCD at the current cursor position. Carriage returns and line
    /// feeds are skipped.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.print(&mut self.device, text)?;
        Ok(self)
    }

    /// Write one character code at the current cursor position.
    pub fn write_byte(&mut self, value: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.write_byte(&mut self.device, value)?;
        Ok(self)
    }

    /// Turn the backlight on or off
    pub fn backlight(&mut self, on: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.actions.backlight(&mut self.device, on)?;
        Ok(self)
    }

    /// Turn the display and the backlight on.
    pub fn on(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_display(true)?.backlight(true)
    }

    /// Turn the display and the backlight off. The display contents are kept.
    pub fn off(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_display(false)?.backlight(false)
    }
}

/// Implement the `core::fmt::Write` trait for the display, allowing it to be used with the `write!` macro.
impl<I2C, DELAY> core::fmt::Write for ExpanderCharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the display, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<I2C, DELAY> ufmt::uWrite for ExpanderCharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<I2C>> {
        self.print(s)?;
        Ok(())
    }

    type Error = CharacterDisplayError<I2C>;
}

#[cfg(test)]
mod lib_tests {
    extern crate std;
    use super::*;
    use core::fmt::Write;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };
    use std::vec::Vec;

    /// `begin(16, 2)` on a PCF8574 wired en=P6, rw=P5, rs=P4, d4..d7=P0..P3 without backlight.
    fn pcf8574_begin_transactions(i2c_address: u8) -> Vec<I2cTransaction> {
        std::vec![
            // all outputs low
            I2cTransaction::write(i2c_address, std::vec![0x00]),
            // wake-up nibbles 0x3, 0x3, 0x3, 0x2
            I2cTransaction::write(i2c_address, std::vec![0x43, 0x03]),
            I2cTransaction::write(i2c_address, std::vec![0x43, 0x03]),
            I2cTransaction::write(i2c_address, std::vec![0x43, 0x03]),
            I2cTransaction::write(i2c_address, std::vec![0x42, 0x02]),
            // LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE | LCD_FLAG_5x8_DOTS | LCD_FLAG_2LINE = 0x28
            I2cTransaction::write(i2c_address, std::vec![0x42, 0x02, 0x48, 0x08]),
            // LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON = 0x0C
            I2cTransaction::write(i2c_address, std::vec![0x40, 0x00, 0x4C, 0x0C]),
            // LCD_CMD_CLEARDISPLAY
            I2cTransaction::write(i2c_address, std::vec![0x40, 0x00, 0x41, 0x01]),
            // LCD_CMD_ENTRYMODESET | LCD_FLAG_ENTRYLEFT = 0x06
            I2cTransaction::write(i2c_address, std::vec![0x40, 0x00, 0x46, 0x06]),
            // no backlight pin, so no backlight write
        ]
    }

    #[test]
    fn test_pcf8574_begin() {
        let expected_i2c_transactions = pcf8574_begin_transactions(0x38);
        let i2c = I2cMock::new(&expected_i2c_transactions);
        let mut lcd = ExpanderCharacterDisplay::from_board(
            i2c,
            NoopDelay::new(),
            Some(0x38),
            Board::ExtraIo,
        );
        assert!(lcd.begin(16, 2, CharacterSize::Dots5x8).is_ok());
        assert!(lcd.is_ready());
        assert_eq!((lcd.cols(), lcd.rows()), (16, 2));
        assert_eq!(lcd.expander().shadow(), 0x06);

        // finish the i2c mock
        lcd.i2c().done();
    }

    #[test]
    fn test_adafruit_begin_and_print() {
        let i2c_address = 0x20_u8;
        let expected_i2c_transactions = [
            // IOCON byte mode, IODIR all outputs, OLAT all low
            I2cTransaction::write(i2c_address, std::vec![0x05, 0x20]),
            I2cTransaction::write(i2c_address, std::vec![0x00, 0x00]),
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x00]),
            // en=GP2, rs=GP1, d4..d7=GP3..GP6
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x1C, 0x18]),
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x1C, 0x18]),
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x1C, 0x18]),
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x14, 0x10]),
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x14, 0x10, 0x44, 0x40]), // 0x28
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x04, 0x00, 0x64, 0x60]), // 0x0C
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x04, 0x00, 0x0C, 0x08]), // 0x01
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x04, 0x00, 0x34, 0x30]), // 0x06
            // backlight on, GP7
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0x80]),
            // 'H' with rs and backlight
            I2cTransaction::write(i2c_address, std::vec![0x0A, 0xA6, 0xA2, 0xC6, 0xC2]),
        ];

        let i2c = I2cMock::new(&expected_i2c_transactions);
        let mut lcd = ExpanderCharacterDisplay::from_board(
            i2c,
            NoopDelay::new(),
            Some(i2c_address),
            Board::Adafruit,
        );
        assert!(lcd.begin(16, 2, CharacterSize::Dots5x8).is_ok());
        assert_eq!(lcd.chip_type(), ChipType::Mcp23008);
        assert!(lcd.print("H\r\n").is_ok());

        // finish the i2c mock
        lcd.i2c().done();
    }

    #[test]
    fn test_auto_locate_and_identify() {
        let i2c_address = 0x27_u8;
        let mut expected_i2c_transactions: Vec<I2cTransaction> = (0..i2c_address)
            .map(|address| {
                I2cTransaction::write(address, std::vec![])
                    .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
            })
            .collect();
        expected_i2c_transactions.extend([
            I2cTransaction::write(i2c_address, std::vec![]),
            I2cTransaction::write(i2c_address, std::vec![0x00, 0xFF]),
            I2cTransaction::write(i2c_address, std::vec![0x00]),
            I2cTransaction::read(i2c_address, std::vec![0x00]),
        ]);
        expected_i2c_transactions.extend(pcf8574_begin_transactions(i2c_address));

        let i2c = I2cMock::new(&expected_i2c_transactions);
        let pins = PinMap::new(6, 5, 4, 0, 1, 2, 3).unwrap();
        let mut lcd =
            ExpanderCharacterDisplay::new(i2c, NoopDelay::new(), None, ChipType::Unknown, pins);
        assert!(!lcd.is_ready());
        assert!(lcd.begin(16, 2, CharacterSize::Dots5x8).is_ok());
        assert_eq!(lcd.address(), Some(i2c_address));
        assert_eq!(lcd.chip_type(), ChipType::Pcf8574);

        lcd.i2c().done();
    }

    #[test]
    fn test_unidentified_chip_leaves_display_inert() {
        let i2c_address = 0x27_u8;
        let expected_i2c_transactions = [
            I2cTransaction::write(i2c_address, std::vec![0x00, 0xFF]),
            I2cTransaction::write(i2c_address, std::vec![0x00]),
            I2cTransaction::read(i2c_address, std::vec![0x42]),
        ];
        let i2c = I2cMock::new(&expected_i2c_transactions);
        let mut lcd = ExpanderCharacterDisplay::new(
            i2c,
            NoopDelay::new(),
            Some(i2c_address),
            ChipType::Unknown,
            Board::YwRobot.pin_map(),
        );
        assert!(matches!(
            lcd.begin(16, 2, CharacterSize::Dots5x8),
            Err(CharacterDisplayError::UnknownChipType)
        ));
        assert!(!lcd.is_ready());

        // everything after a failed begin is silent
        assert!(lcd.clear().is_ok());
        assert!(lcd.set_cursor(0, 1).is_ok());
        assert!(lcd.print("hello").is_ok());
        assert!(lcd.on().is_ok());
        assert!(write!(lcd, "{}", 42).is_ok());

        lcd.i2c().done();
    }

    #[test]
    fn test_invalid_address() {
        let i2c = I2cMock::new(&[]);
        let mut lcd = ExpanderCharacterDisplay::from_board(
            i2c,
            NoopDelay::new(),
            Some(0x80),
            Board::YwRobot,
        );
        assert!(matches!(
            lcd.begin(16, 2, CharacterSize::Dots5x8),
            Err(CharacterDisplayError::InvalidAddress)
        ));
        lcd.i2c().done();
    }

    #[test]
    fn test_write_macro_and_cursor() {
        let mut expected_i2c_transactions = pcf8574_begin_transactions(0x38);
        expected_i2c_transactions.extend([
            // set_cursor(2, 1) = 0x80 | 0x42
            I2cTransaction::write(0x38, std::vec![0x4C, 0x0C, 0x42, 0x02]),
            // '7' = 0x37
            I2cTransaction::write(0x38, std::vec![0x53, 0x13, 0x57, 0x17]),
        ]);
        let i2c = I2cMock::new(&expected_i2c_transactions);
        let mut lcd = ExpanderCharacterDisplay::from_board(
            i2c,
            NoopDelay::new(),
            Some(0x38),
            Board::ExtraIo,
        );
        assert!(lcd.begin(16, 2, CharacterSize::Dots5x8).is_ok());
        assert!(lcd.set_cursor(2, 1).is_ok());
        assert!(write!(lcd, "{}", 7).is_ok());
        assert!(matches!(
            lcd.set_cursor(0, 2),
            Err(CharacterDisplayError::RowOutOfRange)
        ));

        lcd.i2c().done();
    }

    #[test]
    fn test_on_off_negative_backlight() {
        let i2c_address = 0x27_u8;
        let expected_i2c_transactions = [
            I2cTransaction::write(i2c_address, std::vec![0x00]),
            // display off: 0x08 on en=P2, rs=P0, d4..d7=P4..P7, backlight lit (P3 low)
            I2cTransaction::write(i2c_address, std::vec![0x04, 0x00, 0x84, 0x80]),
            // backlight off drives P3 high
            I2cTransaction::write(i2c_address, std::vec![0x08]),
            // display on: 0x0C with the backlight bit now set
            I2cTransaction::write(i2c_address, std::vec![0x0C, 0x08, 0xCC, 0xC8]),
            I2cTransaction::write(i2c_address, std::vec![0x00]),
        ];
        let i2c = I2cMock::new(&expected_i2c_transactions);
        let mut lcd = ExpanderCharacterDisplay::from_board(
            i2c,
            NoopDelay::new(),
            Some(i2c_address),
            Board::Lcm1602,
        );
        // resolve and prime the port without the full begin sequence
        assert!(lcd.device.init().is_ok());

        assert!(lcd.off().is_ok());
        assert!(lcd.on().is_ok());

        lcd.i2c().done();
    }

    #[test]
    fn test_set_backlight_pin_validates() {
        let i2c = I2cMock::new(&[]);
        let pins = PinMap::new(6, 5, 4, 0, 1, 2, 3).unwrap();
        let mut lcd =
            ExpanderCharacterDisplay::new(i2c, NoopDelay::new(), Some(0x38), ChipType::Pcf8574, pins);
        assert!(lcd.set_backlight_pin(7, BacklightPolarity::Positive).is_ok());
        assert!(matches!(
            lcd.set_backlight_pin(8, BacklightPolarity::Positive),
            Err(CharacterDisplayError::InvalidPinMap(PinMapError::PinOutOfRange))
        ));
        assert_eq!(lcd.pin_map().backlight_mask(), 0x80);
        lcd.i2c().done();
    }

    #[test]
    fn test_error_messages() {
        let err: CharacterDisplayError<I2cMock> = ExpanderError::AddressNotFound.into();
        assert_eq!(std::format!("{}", err), "Expander address not found");
        let err: CharacterDisplayError<I2cMock> = PinMapError::DuplicatePin.into();
        assert_eq!(std::format!("{}", err), "Invalid pin map");
        let err: CharacterDisplayError<I2cMock> = ExpanderError::I2cError(ErrorKind::Other).into();
        assert!(matches!(err, CharacterDisplayError::I2cError(ErrorKind::Other)));
    }
}
