use core::marker::PhantomData;

use embedded_hal::{delay::DelayNs, i2c};

use crate::{
    driver::{DeviceHardwareTrait, SendMode},
    CharacterDisplayError, CharacterSize,
};

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Lets you move the cursor
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display entry mode
pub const LCD_FLAG_ENTRYRIGHT: u8 = 0x00; //  Used to set text to flow from right to left
pub const LCD_FLAG_ENTRYLEFT: u8 = 0x02; //  Used to set text to flow from left to right
pub const LCD_FLAG_ENTRYSHIFTINCREMENT: u8 = 0x01; //  Used to 'right justify' text from the cursor
pub const LCD_FLAG_ENTRYSHIFTDECREMENT: u8 = 0x00; //  Used to 'left justify' text from the cursor

// flags for display on/off control
pub const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
pub const LCD_FLAG_DISPLAYOFF: u8 = 0x00; //  Turns the display off
pub const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
pub const LCD_FLAG_CURSOROFF: u8 = 0x00; //  Turns the cursor off
pub const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor
pub const LCD_FLAG_BLINKOFF: u8 = 0x00; //  Turns off the blinking cursor

// flags for display/cursor shift
pub const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
pub const LCD_FLAG_CURSORMOVE: u8 = 0x00; //  Flag for moving the cursor
pub const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
pub const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// flags for function set
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
pub const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
pub const LCD_FLAG_1LINE: u8 = 0x00; //  LCD 1 line mode
pub const LCD_FLAG_5x10_DOTS: u8 = 0x04; //  10 pixel high font mode
pub const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

// execution time of clear and home
const LCD_LONG_COMMAND_DELAY_US: u32 = 2000;

/// HD44780 command sequencer. Holds the display state registers and turns the high level
/// operations into command and data bytes for a `DeviceHardwareTrait` transport. Nothing in here
/// knows how the bytes reach the controller.
pub struct StandardCharacterDisplayHandler<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: DeviceHardwareTrait<I2C, DELAY>,
{
    display_function: u8,
    display_control: u8,
    display_mode: u8,
    cols: u8,
    rows: u8,
    _marker: PhantomData<(I2C, DELAY, DEVICE)>,
}

impl<I2C, DELAY, DEVICE> Default for StandardCharacterDisplayHandler<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: DeviceHardwareTrait<I2C, DELAY>,
{
    fn default() -> Self {
        Self {
            display_function: 0,
            display_control: 0,
            display_mode: 0,
            cols: 0,
            rows: 0,
            _marker: PhantomData,
        }
    }
}

impl<I2C, DELAY, DEVICE> StandardCharacterDisplayHandler<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: DeviceHardwareTrait<I2C, DELAY>,
{
    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn display_function(&self) -> u8 {
        self.display_function
    }

    pub fn display_control(&self) -> u8 {
        self.display_control
    }

    pub fn display_mode(&self) -> u8 {
        self.display_mode
    }

    /// DDRAM address of the first column of each row.
    fn row_offsets(&self) -> [u8; 4] {
        if self.cols == 16 && self.rows == 4 {
            [0x00, 0x40, 0x10, 0x50]
        } else {
            [0x00, 0x40, 0x14, 0x54]
        }
    }

    /// Prepare the transport and run the HD44780 4-bit initialization by instruction. The
    /// geometry is recorded before the transport is touched, so cursor range checks hold even
    /// when the transport fails to come up.
    pub fn begin(
        &mut self,
        device: &mut DEVICE,
        cols: u8,
        rows: u8,
        char_size: CharacterSize,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.cols = cols;
        self.rows = rows;
        self.display_function = LCD_FLAG_4BITMODE | LCD_FLAG_1LINE | LCD_FLAG_5x8_DOTS;
        if rows > 1 {
            self.display_function |= LCD_FLAG_2LINE;
        }
        // the 10 pixel font only exists in 1 line mode
        if char_size == CharacterSize::Dots5x10 && rows == 1 {
            self.display_function |= LCD_FLAG_5x10_DOTS;
        }
        self.display_control = LCD_FLAG_DISPLAYON | LCD_FLAG_CURSOROFF | LCD_FLAG_BLINKOFF;
        self.display_mode = LCD_FLAG_ENTRYLEFT | LCD_FLAG_ENTRYSHIFTDECREMENT;

        device.init()?;

        // wait for the controller's power-on reset
        device.delay().delay_ms(100);

        // put the controller into 4-bit mode from any state
        device.send(0x03, SendMode::Nibble)?;
        device.delay().delay_us(4500);
        device.send(0x03, SendMode::Nibble)?;
        device.delay().delay_us(150);
        device.send(0x03, SendMode::Nibble)?;
        device.delay().delay_us(150);
        device.send(0x02, SendMode::Nibble)?;
        device.delay().delay_us(150);

        self.command(device, LCD_CMD_FUNCTIONSET | self.display_function)?;
        device.delay().delay_us(60);

        self.command(device, LCD_CMD_DISPLAYCONTROL | self.display_control)?;
        self.clear(device)?;
        self.command(device, LCD_CMD_ENTRYMODESET | self.display_mode)?;

        device.set_backlight(true)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("LCD initialized as {}x{}", cols, rows);
        Ok(())
    }

    /// Send a raw instruction byte.
    pub fn command(&mut self, device: &mut DEVICE, value: u8) -> Result<(), CharacterDisplayError<I2C>> {
        device.send(value, SendMode::Command)
    }

    pub fn clear(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_CLEARDISPLAY)?;
        // wait for command to complete
        device.delay().delay_us(LCD_LONG_COMMAND_DELAY_US);
        Ok(())
    }

    pub fn home(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_RETURNHOME)?;
        // wait for command to complete
        device.delay().delay_us(LCD_LONG_COMMAND_DELAY_US);
        Ok(())
    }

    pub fn set_cursor(
        &mut self,
        device: &mut DEVICE,
        col: u8,
        row: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        if row >= self.rows {
            return Err(CharacterDisplayError::RowOutOfRange);
        }
        if col >= self.cols {
            return Err(CharacterDisplayError::ColumnOutOfRange);
        }
        let offset = self
            .row_offsets()
            .get(row as usize)
            .copied()
            .ok_or(CharacterDisplayError::RowOutOfRange)?;
        self.command(device, LCD_CMD_SETDDRAMADDR | col.wrapping_add(offset))
    }

    fn update_display_control(
        &mut self,
        device: &mut DEVICE,
        flag: u8,
        set: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        if set {
            self.display_control |= flag;
        } else {
            self.display_control &= !flag;
        }
        self.command(device, LCD_CMD_DISPLAYCONTROL | self.display_control)
    }

    fn update_display_mode(
        &mut self,
        device: &mut DEVICE,
        flag: u8,
        set: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        if set {
            self.display_mode |= flag;
        } else {
            self.display_mode &= !flag;
        }
        self.command(device, LCD_CMD_ENTRYMODESET | self.display_mode)
    }

    pub fn show_display(
        &mut self,
        device: &mut DEVICE,
        show_display: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_control(device, LCD_FLAG_DISPLAYON, show_display)
    }

    pub fn show_cursor(
        &mut self,
        device: &mut DEVICE,
        show_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_control(device, LCD_FLAG_CURSORON, show_cursor)
    }

    pub fn blink_cursor(
        &mut self,
        device: &mut DEVICE,
        blink_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_control(device, LCD_FLAG_BLINKON, blink_cursor)
    }

    pub fn scroll_left(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVELEFT,
        )
    }

    pub fn scroll_right(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVERIGHT,
        )
    }

    pub fn move_cursor_left(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_CURSORMOVE | LCD_FLAG_MOVELEFT,
        )
    }

    pub fn move_cursor_right(
        &mut self,
        device: &mut DEVICE,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_CURSORMOVE | LCD_FLAG_MOVERIGHT,
        )
    }

    pub fn left_to_right(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_mode(device, LCD_FLAG_ENTRYLEFT, true)
    }

    pub fn right_to_left(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_mode(device, LCD_FLAG_ENTRYLEFT, false)
    }

    pub fn autoscroll(
        &mut self,
        device: &mut DEVICE,
        autoscroll: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.update_display_mode(device, LCD_FLAG_ENTRYSHIFTINCREMENT, autoscroll)
    }

    /// Load a glyph into one of the 8 CGRAM slots. The address counter is left in CGRAM, so
    /// position the cursor before printing again.
    pub fn create_char(
        &mut self,
        device: &mut DEVICE,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_SETCGRAMADDR | ((location & 0x7) << 3))?;
        for row in charmap {
            device.send(row, SendMode::RawData)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, device: &mut DEVICE, value: u8) -> Result<(), CharacterDisplayError<I2C>> {
        device.send(value, SendMode::Data)
    }

    pub fn print(&mut self, device: &mut DEVICE, text: &str) -> Result<(), CharacterDisplayError<I2C>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Printing: {}", text);
        for byte in text.bytes() {
            self.write_byte(device, byte)?;
        }
        Ok(())
    }

    pub fn backlight(&mut self, device: &mut DEVICE, on: bool) -> Result<(), CharacterDisplayError<I2C>> {
        device.set_backlight(on)
    }
}
