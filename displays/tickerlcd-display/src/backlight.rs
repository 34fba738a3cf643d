//! RGB backlight colors
//!
//! The discriminants are the 3-bit RGB masks used by the Adafruit RGB LCD
//! shield: bit 0 red, bit 1 green, bit 2 blue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Backlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Backlight {
    Off = 0x0,
    Red = 0x1,
    Green = 0x2,
    Yellow = 0x3,
    Blue = 0x4,
    Violet = 0x5,
    Teal = 0x6,
    #[default]
    White = 0x7,
}

impl Backlight {
    /// RGB bit mask (bit 0 red, bit 1 green, bit 2 blue)
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn red(self) -> bool {
        self.bits() & 0x1 != 0
    }

    pub const fn green(self) -> bool {
        self.bits() & 0x2 != 0
    }

    pub const fn blue(self) -> bool {
        self.bits() & 0x4 != 0
    }

    /// Color for an RGB bit mask (upper bits ignored)
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0x0 => Backlight::Off,
            0x1 => Backlight::Red,
            0x2 => Backlight::Green,
            0x3 => Backlight::Yellow,
            0x4 => Backlight::Blue,
            0x5 => Backlight::Violet,
            0x6 => Backlight::Teal,
            _ => Backlight::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bits() {
        assert!(Backlight::Yellow.red());
        assert!(Backlight::Yellow.green());
        assert!(!Backlight::Yellow.blue());
        assert!(Backlight::Teal.blue());
        assert!(!Backlight::Teal.red());
    }

    #[test]
    fn test_from_bits_masks_upper_bits() {
        assert_eq!(Backlight::from_bits(0x0A), Backlight::Green);
        assert_eq!(Backlight::from_bits(Backlight::Violet.bits()), Backlight::Violet);
    }
}
