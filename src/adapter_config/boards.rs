// Canned wiring for common backpack boards.
// Boards that tie the LCD RW line to ground still get an unused expander pin assigned to RW. The
// driver holds it low and the LCD ignores it.

use crate::expander::ChipType;

use super::{BacklightPolarity, PinMap};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Known I2C LCD backpacks.
pub enum Board {
    /// ElectroFun "extra I/O" wiring without backlight control
    ExtraIo,
    /// ElectroFun wiring with an NPN transistor on the backlight
    ExtraIoWithBacklight,
    /// mjkdz backpack
    Mjkdz,
    /// Robot Arduino LCM1602 backpack
    Lcm1602,
    /// YwRobot backpack
    YwRobot,
    /// DFRobot backpack, same wiring as YwRobot
    DfRobot,
    /// SainSmart backpack, same wiring as YwRobot
    SainSmart,
    /// Adafruit #292 I2C/SPI backpack in I2C mode. The LCD RW line is grounded on this board.
    Adafruit,
}

impl Board {
    /// Expander chip fitted to the board.
    pub const fn chip_type(&self) -> ChipType {
        match self {
            Board::Adafruit => ChipType::Mcp23008,
            _ => ChipType::Pcf8574,
        }
    }

    /// Wiring of the board, backlight included.
    pub const fn pin_map(&self) -> PinMap {
        //                                  en rw rs   d4 d5 d6 d7
        match self {
            Board::ExtraIo => PinMap::from_pins(6, 5, 4, [0, 1, 2, 3]),
            Board::ExtraIoWithBacklight => PinMap::from_pins(6, 5, 4, [0, 1, 2, 3])
                .backlight_pin_unchecked(7, BacklightPolarity::Negative),
            Board::Mjkdz => PinMap::from_pins(4, 5, 6, [0, 1, 2, 3])
                .backlight_pin_unchecked(7, BacklightPolarity::Negative),
            Board::Lcm1602 => PinMap::from_pins(2, 1, 0, [4, 5, 6, 7])
                .backlight_pin_unchecked(3, BacklightPolarity::Negative),
            Board::YwRobot | Board::DfRobot | Board::SainSmart => {
                PinMap::from_pins(2, 1, 0, [4, 5, 6, 7])
                    .backlight_pin_unchecked(3, BacklightPolarity::Positive)
            }
            Board::Adafruit => PinMap::from_pins(2, 0, 1, [3, 4, 5, 6])
                .backlight_pin_unchecked(7, BacklightPolarity::Positive),
        }
    }
}
