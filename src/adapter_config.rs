pub mod boards;

use core::fmt::Display;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Errors for an invalid backpack wiring description
pub enum PinMapError {
    /// Pin number is not in 0..=7
    PinOutOfRange,
    /// Two LCD lines were assigned to the same expander pin
    DuplicatePin,
}

impl From<&PinMapError> for &'static str {
    fn from(err: &PinMapError) -> Self {
        match err {
            PinMapError::PinOutOfRange => "Pin out of range",
            PinMapError::DuplicatePin => "Duplicate pin assignment",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinMapError {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for PinMapError {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for PinMapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Level the backlight pin must be driven to for the backlight to be lit.
pub enum BacklightPolarity {
    /// Pin high turns the backlight on
    Positive,
    /// Pin low turns the backlight on, typically through a PNP transistor
    Negative,
}

/// Where each HD44780 line sits on the expander's 8-bit port. Every field is a single-bit mask.
/// A `backlight` mask of zero means the backpack has no switchable backlight.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct PinMap {
    enable: u8,
    read_write: u8,
    register_select: u8,
    data: [u8; 4],
    backlight: u8,
    polarity: BacklightPolarity,
}

impl PinMap {
    /// Build a pin map from expander pin numbers (0..=7). The data pins are the HD44780 D4..D7
    /// lines used in 4-bit mode. The map starts without backlight control.
    pub fn new(
        enable: u8,
        read_write: u8,
        register_select: u8,
        d4: u8,
        d5: u8,
        d6: u8,
        d7: u8,
    ) -> Result<Self, PinMapError> {
        let mut used = 0u8;
        for pin in [enable, read_write, register_select, d4, d5, d6, d7] {
            used = claim_pin(used, pin)?;
        }
        Ok(Self::from_pins(enable, read_write, register_select, [d4, d5, d6, d7]))
    }

    /// Pin map with a backlight pin attached.
    pub fn with_backlight(
        mut self,
        pin: u8,
        polarity: BacklightPolarity,
    ) -> Result<Self, PinMapError> {
        self.set_backlight_pin(pin, polarity)?;
        Ok(self)
    }

    /// Unchecked constructor for the canned board tables.
    pub(crate) const fn from_pins(
        enable: u8,
        read_write: u8,
        register_select: u8,
        data: [u8; 4],
    ) -> Self {
        Self {
            enable: 1 << enable,
            read_write: 1 << read_write,
            register_select: 1 << register_select,
            data: [1 << data[0], 1 << data[1], 1 << data[2], 1 << data[3]],
            backlight: 0,
            polarity: BacklightPolarity::Positive,
        }
    }

    pub(crate) const fn backlight_pin_unchecked(mut self, pin: u8, polarity: BacklightPolarity) -> Self {
        self.backlight = 1 << pin;
        self.polarity = polarity;
        self
    }

    /// Record the backlight pin and polarity. Only the configuration changes, nothing is written
    /// to the hardware.
    pub fn set_backlight_pin(
        &mut self,
        pin: u8,
        polarity: BacklightPolarity,
    ) -> Result<(), PinMapError> {
        let others = self.lcd_lines_mask();
        claim_pin(others, pin)?;
        self.backlight = 1 << pin;
        self.polarity = polarity;
        Ok(())
    }

    pub fn enable_mask(&self) -> u8 {
        self.enable
    }

    pub fn read_write_mask(&self) -> u8 {
        self.read_write
    }

    pub fn register_select_mask(&self) -> u8 {
        self.register_select
    }

    /// Masks for D4, D5, D6 and D7, in that order.
    pub fn data_masks(&self) -> [u8; 4] {
        self.data
    }

    pub fn backlight_mask(&self) -> u8 {
        self.backlight
    }

    pub fn polarity(&self) -> BacklightPolarity {
        self.polarity
    }

    pub fn has_backlight(&self) -> bool {
        self.backlight != 0
    }

    fn lcd_lines_mask(&self) -> u8 {
        self.enable
            | self.read_write
            | self.register_select
            | self.data[0]
            | self.data[1]
            | self.data[2]
            | self.data[3]
    }

    /// Every bit this map drives.
    pub fn used_mask(&self) -> u8 {
        self.lcd_lines_mask() | self.backlight
    }

    /// Backlight bits to fold into every port write for the requested backlight state.
    pub fn backlight_status(&self, on: bool) -> u8 {
        match (self.polarity, on) {
            (BacklightPolarity::Positive, true) | (BacklightPolarity::Negative, false) => {
                self.backlight
            }
            _ => 0,
        }
    }

    /// Port value presenting the low 4 bits of `nibble` on D4..D7. RS is raised for data
    /// transfers, RW stays low, and enable is left to the caller. Bits of `backlight_status`
    /// outside the backlight pin are ignored.
    pub fn render_nibble(&self, nibble: u8, data_mode: bool, backlight_status: u8) -> u8 {
        let mut value = 0;
        for (bit, mask) in self.data.iter().enumerate() {
            if (nibble >> bit) & 0x01 == 1 {
                value |= mask;
            }
        }
        if data_mode {
            value |= self.register_select;
        }
        value | (backlight_status & self.backlight)
    }
}

fn claim_pin(used: u8, pin: u8) -> Result<u8, PinMapError> {
    if pin > 7 {
        return Err(PinMapError::PinOutOfRange);
    }
    let mask = 1 << pin;
    if used & mask != 0 {
        return Err(PinMapError::DuplicatePin);
    }
    Ok(used | mask)
}
