use embedded_hal::i2c;

use super::{ChipType, ExpanderError, MCP23008_IODIR};

/// Tell a PCF8574 from an MCP23008 at `address`.
///
/// Neither chip has an ID register, so the probe relies on how each one interprets the same
/// byte sequence:
///
/// 1. write `[0x00, 0xFF]`: the MCP23008 sets IODIR to all inputs; the PCF8574 drives its port
///    to `0x00` and then `0xFF`.
/// 2. write `[0x00]`: the MCP23008 points at IODIR again; the PCF8574 drives its port to `0x00`.
/// 3. read one byte: the MCP23008 returns IODIR (`0xFF`); the PCF8574 returns its port (`0x00`).
///
/// Any other response is `ChipType::Unknown`. The probe overwrites the device's state, and it
/// assumes nothing else on the bus disturbs the port between the steps.
pub fn identify_chip<I2C>(i2c: &mut I2C, address: u8) -> Result<ChipType, ExpanderError<I2C>>
where
    I2C: i2c::I2c,
{
    i2c.write(address, &[MCP23008_IODIR, 0xFF])
        .map_err(ExpanderError::I2cError)?;
    i2c.write(address, &[MCP23008_IODIR])
        .map_err(ExpanderError::I2cError)?;

    let mut data = [0u8];
    i2c.read(address, &mut data)
        .map_err(ExpanderError::I2cError)?;

    Ok(ChipType::from_probe_response(data[0]))
}
