use embedded_hal::i2c;

use super::{identify_chip, ChipType, MAX_I2C_ADDRESS};

/// Scan the whole 7-bit address space, lowest address first, for a GPIO expander.
///
/// Each address is probed with an empty write. An address that acknowledges is then run through
/// `identify_chip`; a device that cannot be identified is skipped and the scan goes on. Returns
/// the first positively identified address, or `None` when the scan runs out.
///
/// Identification writes to every acknowledging device, so only scan a bus where the expander
/// is the sole device. Intended to run once at start-up.
pub fn locate_device<I2C>(i2c: &mut I2C) -> Option<u8>
where
    I2C: i2c::I2c,
{
    scan_for_expander(i2c).map(|(address, _)| address)
}

/// Same scan as `locate_device`, also handing back the chip type found.
pub(crate) fn scan_for_expander<I2C>(i2c: &mut I2C) -> Option<(u8, ChipType)>
where
    I2C: i2c::I2c,
{
    for address in 0..=MAX_I2C_ADDRESS {
        if i2c.write(address, &[]).is_err() {
            continue;
        }
        match identify_chip(i2c, address) {
            Ok(ChipType::Unknown) | Err(_) => continue,
            Ok(chip) => return Some((address, chip)),
        }
    }
    None
}
