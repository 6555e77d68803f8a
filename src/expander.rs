// 8-bit I2C GPIO expander support.
// Two chip families are handled: the PCF8574 (quasi-bidirectional port, no registers) and the
// MCP23008 (register file addressed by a leading pointer byte). Neither part carries an ID
// register, so `identify` tells them apart by a register side effect, and `locate` scans the
// bus for the first address that identifies positively.

pub mod identify;
pub mod locate;

use bitfield::bitfield;
use core::fmt::Display;
use embedded_hal::i2c;

pub use identify::identify_chip;
pub use locate::locate_device;

// MCP23008 registers
pub(crate) const MCP23008_IODIR: u8 = 0x00; //  I/O direction, 1 = input
pub(crate) const MCP23008_IOCON: u8 = 0x05; //  Configuration
pub(crate) const MCP23008_GPIO: u8 = 0x09; //  Port value (reads the pins)
pub(crate) const MCP23008_OLAT: u8 = 0x0A; //  Output latch

/// Highest valid 7-bit I2C address.
pub const MAX_I2C_ADDRESS: u8 = 0x7F;

/// Largest number of output bytes that can be sent in one bus transaction. Two enable pulses per
/// nibble and two nibbles per byte.
pub const MAX_BURST_LEN: usize = 4;

bitfield! {
    /// MCP23008 IOCON register.
    pub struct Mcp23008Iocon(u8);
    impl Debug;
    pub intpol, set_intpol: 1;
    pub odr, set_odr: 2;
    pub haen, set_haen: 3;
    pub disslw, set_disslw: 4;
    /// When set, the register pointer does not advance after each byte ("byte mode").
    pub seqop, set_seqop: 5;
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// The GPIO expander chip family on the backpack.
pub enum ChipType {
    /// Not known yet. Used at construction time to request auto-detection.
    Unknown,
    /// NXP/TI PCF8574 or PCF8574A
    Pcf8574,
    /// Microchip MCP23008
    Mcp23008,
}

impl ChipType {
    /// Interpret the byte read back at the end of the identification probe.
    pub const fn from_probe_response(response: u8) -> Self {
        match response {
            0xFF => ChipType::Mcp23008,
            0x00 => ChipType::Pcf8574,
            _ => ChipType::Unknown,
        }
    }

    /// Register pointer that must lead every output write, if the chip has one.
    pub const fn output_register(&self) -> Option<u8> {
        match self {
            ChipType::Mcp23008 => Some(MCP23008_OLAT),
            _ => None,
        }
    }
}

impl From<&ChipType> for &'static str {
    fn from(chip: &ChipType) -> Self {
        match chip {
            ChipType::Unknown => "Unknown",
            ChipType::Pcf8574 => "PCF8574",
            ChipType::Mcp23008 => "MCP23008",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChipType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for ChipType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for ChipType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Direction of an expander pin.
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when talking to the GPIO expander
pub enum ExpanderError<I2C>
where
    I2C: i2c::I2c,
{
    /// Bus scan finished without a positively identified expander
    AddressNotFound,
    /// The chip at the address could not be identified
    UnknownChipType,
    /// Address or chip type has not been resolved yet
    Unresolved,
    /// The configured address is not a 7-bit address
    InvalidAddress,
    /// Pin number is not in 0..=7
    PinOutOfRange,
    /// More output bytes than fit in one transaction
    BufferTooSmall,
    /// I2C error returned from the underlying I2C implementation
    I2cError(I2C::Error),
}

impl<I2C> From<&ExpanderError<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &ExpanderError<I2C>) -> Self {
        match err {
            ExpanderError::AddressNotFound => "Expander address not found",
            ExpanderError::UnknownChipType => "Unknown expander chip type",
            ExpanderError::Unresolved => "Expander not resolved",
            ExpanderError::InvalidAddress => "Invalid I2C address",
            ExpanderError::PinOutOfRange => "Pin out of range",
            ExpanderError::BufferTooSmall => "Buffer too small",
            ExpanderError::I2cError(_) => "I2C error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for ExpanderError<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for ExpanderError<I2C>
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

impl<I2C> Display for ExpanderError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

/// Register-level state of one GPIO expander. The expander does not own the bus; every
/// operation borrows it, so the same bus can be handed to other peripherals between calls.
///
/// `direction_mask` uses the MCP23008 convention (1 = input, 0 = output) for both chips.
/// Bits configured as inputs are never driven by a write and are masked off on reads.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Expander {
    address: Option<u8>,
    chip: ChipType,
    direction_mask: u8,
    shadow: u8,
}

impl Expander {
    /// Create an expander handle. `None` for the address requests a bus scan and
    /// `ChipType::Unknown` requests identification, both performed by `resolve`.
    pub const fn new(address: Option<u8>, chip: ChipType) -> Self {
        Self {
            address,
            chip,
            direction_mask: 0xFF,
            shadow: 0,
        }
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }

    pub fn chip(&self) -> ChipType {
        self.chip
    }

    pub fn direction_mask(&self) -> u8 {
        self.direction_mask
    }

    /// The last value written to the output-configured pins.
    pub fn shadow(&self) -> u8 {
        self.shadow
    }

    /// Both the address and the chip type are known.
    pub fn is_resolved(&self) -> bool {
        self.address.is_some() && self.chip != ChipType::Unknown
    }

    fn target<I2C>(&self) -> Result<(u8, ChipType), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        match (self.address, self.chip) {
            (Some(address), chip) if chip != ChipType::Unknown => Ok((address, chip)),
            _ => Err(ExpanderError::Unresolved),
        }
    }

    /// Find the address (if not configured) and the chip type (if not configured).
    ///
    /// Both steps write to the device and leave its port in an arbitrary state. The bus scan is
    /// only reliable when the expander is the sole device on the bus. Call once, before any
    /// other use of the expander.
    pub fn resolve<I2C>(&mut self, i2c: &mut I2C) -> Result<(u8, ChipType), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        let address = match self.address {
            Some(address) if address > MAX_I2C_ADDRESS => {
                return Err(ExpanderError::InvalidAddress)
            }
            Some(address) => address,
            None => {
                let (address, chip) =
                    locate::scan_for_expander(i2c).ok_or(ExpanderError::AddressNotFound)?;
                #[cfg(feature = "defmt")]
                defmt::debug!("Located {} expander at {:#x}", chip, address);
                self.address = Some(address);
                if self.chip == ChipType::Unknown {
                    self.chip = chip;
                }
                address
            }
        };

        if self.chip == ChipType::Unknown {
            self.chip = identify_chip(i2c, address)?;
            #[cfg(feature = "defmt")]
            defmt::debug!("Identified expander at {:#x} as {}", address, self.chip);
        }
        if self.chip == ChipType::Unknown {
            return Err(ExpanderError::UnknownChipType);
        }
        Ok((address, self.chip))
    }

    /// Make every pin an output. On the MCP23008 this also switches the chip to byte mode so
    /// that output bytes following one OLAT pointer all land in OLAT. The PCF8574 has no
    /// direction register; only the software state changes.
    pub fn configure_all_outputs<I2C>(&mut self, i2c: &mut I2C) -> Result<(), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        let (address, chip) = self.target()?;
        if chip == ChipType::Mcp23008 {
            let mut iocon = Mcp23008Iocon(0);
            iocon.set_seqop(true);
            i2c.write(address, &[MCP23008_IOCON, iocon.0])
                .map_err(ExpanderError::I2cError)?;
            i2c.write(address, &[MCP23008_IODIR, 0x00])
                .map_err(ExpanderError::I2cError)?;
        }
        self.direction_mask = 0x00;
        self.shadow = 0x00;
        Ok(())
    }

    /// Write one byte to the output port. Input-configured bits are sent as 0.
    pub fn write_output_byte<I2C>(
        &mut self,
        i2c: &mut I2C,
        value: u8,
    ) -> Result<(), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        self.write_output_burst(i2c, &[value])
    }

    /// Write several output bytes back to back within a single bus transaction. On the MCP23008
    /// one OLAT pointer leads the whole burst, which relies on byte mode being enabled.
    pub fn write_output_burst<I2C>(
        &mut self,
        i2c: &mut I2C,
        values: &[u8],
    ) -> Result<(), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        let (address, chip) = self.target()?;
        if values.is_empty() {
            return Ok(());
        }
        if values.len() > MAX_BURST_LEN {
            return Err(ExpanderError::BufferTooSmall);
        }

        let mut frame = [0u8; MAX_BURST_LEN + 1];
        let mut idx: usize = 0;
        if let Some(register) = chip.output_register() {
            frame[idx] = register;
            idx += 1;
        }
        let mut last = self.shadow;
        for value in values {
            last = value & !self.direction_mask;
            frame[idx] = last;
            idx += 1;
        }
        i2c.write(address, &frame[..idx])
            .map_err(ExpanderError::I2cError)?;
        self.shadow = last;
        Ok(())
    }

    /// Read the port pins. The value is returned unmasked; combine with `direction_mask` to keep
    /// only the input pins.
    pub fn read_input_byte<I2C>(&mut self, i2c: &mut I2C) -> Result<u8, ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        let (address, chip) = self.target()?;
        if chip == ChipType::Mcp23008 {
            i2c.write(address, &[MCP23008_GPIO])
                .map_err(ExpanderError::I2cError)?;
        }
        let mut data = [0u8];
        i2c.read(address, &mut data)
            .map_err(ExpanderError::I2cError)?;
        Ok(data[0])
    }

    /// Set the direction of one pin. Only the software mask changes; the next write applies it.
    pub fn pin_mode<I2C>(&mut self, pin: u8, direction: Direction) -> Result<(), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        if pin > 7 {
            return Err(ExpanderError::PinOutOfRange);
        }
        match direction {
            Direction::Output => self.direction_mask &= !(1 << pin),
            Direction::Input => self.direction_mask |= 1 << pin,
        }
        Ok(())
    }

    /// Set the direction of the whole port.
    pub fn port_mode(&mut self, direction: Direction) {
        self.direction_mask = match direction {
            Direction::Input => 0xFF,
            Direction::Output => 0x00,
        };
    }

    /// Drive a single output pin. Pins configured as inputs are left untouched.
    pub fn digital_write<I2C>(
        &mut self,
        i2c: &mut I2C,
        pin: u8,
        high: bool,
    ) -> Result<(), ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        if pin > 7 {
            return Err(ExpanderError::PinOutOfRange);
        }
        let bit = (1 << pin) & !self.direction_mask;
        let value = if high {
            self.shadow | bit
        } else {
            self.shadow & !bit
        };
        self.write_output_byte(i2c, value)
    }

    /// Read a single input pin. Output-configured pins always read low.
    pub fn digital_read<I2C>(&mut self, i2c: &mut I2C, pin: u8) -> Result<bool, ExpanderError<I2C>>
    where
        I2C: i2c::I2c,
    {
        if pin > 7 {
            return Err(ExpanderError::PinOutOfRange);
        }
        let value = self.read_input_byte(i2c)? & self.direction_mask;
        Ok((value >> pin) & 0x01 == 1)
    }
}
