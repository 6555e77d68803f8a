use embedded_hal::{delay::DelayNs, i2c};

use crate::{
    adapter_config::{BacklightPolarity, PinMap},
    driver::{DeviceHardwareTrait, SendMode},
    expander::{ChipType, Expander, MAX_BURST_LEN},
    CharacterDisplayError, DeviceSetupConfig,
};

/// Adapter driving an HD44780 in 4-bit mode through a PCF8574 or MCP23008 expander with
/// arbitrary wiring. Each LCD byte goes out as one bus transaction holding both nibbles and
/// their enable pulses; the transaction time covers the HD44780 enable pulse width, so no
/// delays are inserted.
pub struct ExpanderLcdAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    config: DeviceSetupConfig<I2C, DELAY>,
    expander: Expander,
    pin_map: PinMap,
    backlight_status: u8,
}

impl<I2C, DELAY> ExpanderLcdAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    pub fn new(config: DeviceSetupConfig<I2C, DELAY>, expander: Expander, pin_map: PinMap) -> Self {
        Self {
            config,
            expander,
            pin_map,
            backlight_status: 0,
        }
    }

    pub fn expander(&self) -> &Expander {
        &self.expander
    }

    pub fn pin_map(&self) -> &PinMap {
        &self.pin_map
    }

    /// Backlight bits currently folded into every port write.
    pub fn backlight_status(&self) -> u8 {
        self.backlight_status
    }

    /// Record the backlight pin. Does not touch the hardware.
    pub fn set_backlight_pin(
        &mut self,
        pin: u8,
        polarity: BacklightPolarity,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.pin_map.set_backlight_pin(pin, polarity)?;
        Ok(())
    }

    /// Address and chip type, once both are known.
    pub fn resolved(&self) -> Option<(u8, ChipType)> {
        match self.expander.address() {
            Some(address) if self.expander.is_resolved() => Some((address, self.expander.chip())),
            _ => None,
        }
    }

    /// Hands back the bus and delay objects.
    pub fn release(self) -> (I2C, DELAY) {
        (self.config.i2c, self.config.delay)
    }

    /// The two port values for one nibble: enable high to present the lines, then enable low
    /// to latch them.
    fn enable_pulse(&self, nibble: u8, data_mode: bool) -> [u8; 2] {
        let value = self
            .pin_map
            .render_nibble(nibble, data_mode, self.backlight_status);
        let enable = self.pin_map.enable_mask();
        [value | enable, value & !enable]
    }
}

impl<I2C, DELAY> DeviceHardwareTrait<I2C, DELAY> for ExpanderLcdAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn init(&mut self) -> Result<(), CharacterDisplayError<I2C>> {
        let (_address, _chip) = self.expander.resolve(&mut self.config.i2c)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("Configuring {} expander at {:#x}", _chip, _address);

        self.expander.configure_all_outputs(&mut self.config.i2c)?;
        // all LCD lines low
        self.expander.write_output_byte(&mut self.config.i2c, 0)?;
        Ok(())
    }

    fn send(&mut self, value: u8, mode: SendMode) -> Result<(), CharacterDisplayError<I2C>> {
        if !self.expander.is_resolved() {
            return Ok(());
        }
        if mode == SendMode::Data && (value == b'\r' || value == b'\n') {
            return Ok(());
        }

        let mut pulses = [0u8; MAX_BURST_LEN];
        let len = match mode {
            SendMode::Nibble => {
                pulses[..2].copy_from_slice(&self.enable_pulse(value & 0x0F, false));
                2
            }
            SendMode::Command | SendMode::Data | SendMode::RawData => {
                let data_mode = mode != SendMode::Command;
                pulses[..2].copy_from_slice(&self.enable_pulse(value >> 4, data_mode));
                pulses[2..].copy_from_slice(&self.enable_pulse(value & 0x0F, data_mode));
                4
            }
        };
        self.expander
            .write_output_burst(&mut self.config.i2c, &pulses[..len])?;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), CharacterDisplayError<I2C>> {
        self.backlight_status = self.pin_map.backlight_status(on);
        if !self.pin_map.has_backlight() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Backlight not supported");
            return Ok(());
        }
        if !self.expander.is_resolved() {
            return Ok(());
        }
        self.expander
            .write_output_byte(&mut self.config.i2c, self.backlight_status)?;
        Ok(())
    }

    fn delay(&mut self) -> &mut DELAY {
        &mut self.config.delay
    }

    fn i2c(&mut self) -> &mut I2C {
        &mut self.config.i2c
    }
}
