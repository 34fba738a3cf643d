//! Front-panel buttons
//!
//! Bit assignments follow the Adafruit RGB LCD shield, where the five keys
//! sit on GPA0-GPA4 of the MCP23017.

use crate::backend::DisplayError;

/// A single front-panel button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Select,
    Right,
    Down,
    Up,
    Left,
}

impl Button {
    /// All buttons in bit order
    pub const ALL: [Button; 5] = [
        Button::Select,
        Button::Right,
        Button::Down,
        Button::Up,
        Button::Left,
    ];

    /// Bit mask of this button in a `Buttons` set
    pub const fn mask(self) -> u8 {
        match self {
            Button::Select => 0x01,
            Button::Right => 0x02,
            Button::Down => 0x04,
            Button::Up => 0x08,
            Button::Left => 0x10,
        }
    }
}

/// Set of buttons held down at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(u8);

impl Buttons {
    /// No buttons pressed
    pub const NONE: Self = Self(0);

    /// Build a set from a raw bit mask (bits above the five keys are ignored)
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set with `button` added
    pub const fn with(self, button: Button) -> Self {
        Self(self.0 | button.mask())
    }

    /// Buttons held now that were not held in `previous`
    pub const fn pressed_since(self, previous: Buttons) -> Self {
        Self(self.0 & !previous.0)
    }

    /// Iterate over the buttons in this set, in bit order
    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl From<Button> for Buttons {
    fn from(button: Button) -> Self {
        Self(button.mask())
    }
}

/// Source of button state
///
/// Implemented by keypad drivers. Polled once per main-loop iteration.
pub trait ButtonSource {
    /// Read the set of buttons currently held down
    fn read_buttons(&mut self) -> Result<Buttons, DisplayError>;
}

/// A set already read from hardware replays itself
impl ButtonSource for Buttons {
    fn read_buttons(&mut self) -> Result<Buttons, DisplayError> {
        Ok(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_replays() {
        let mut held = Buttons::from(Button::Up);
        assert_eq!(held.read_buttons(), Ok(Buttons::from(Button::Up)));
        assert_eq!(held.read_buttons(), Ok(Buttons::from(Button::Up)));
    }

    #[test]
    fn test_from_bits_ignores_upper_bits() {
        let buttons = Buttons::from_bits(0xE1);
        assert_eq!(buttons.bits(), 0x01);
        assert!(buttons.contains(Button::Select));
    }

    #[test]
    fn test_pressed_since_reports_new_presses_only() {
        let before = Buttons::from(Button::Up);
        let now = before.with(Button::Right);
        let pressed = now.pressed_since(before);

        assert!(pressed.contains(Button::Right));
        assert!(!pressed.contains(Button::Up));
        assert!(now.pressed_since(now).is_empty());
    }

    #[test]
    fn test_iter_in_bit_order() {
        let buttons = Buttons::NONE.with(Button::Left).with(Button::Select);
        let mut iter = buttons.iter();
        assert_eq!(iter.next(), Some(Button::Select));
        assert_eq!(iter.next(), Some(Button::Left));
        assert_eq!(iter.next(), None);
    }
}
