//! Button handling
//!
//! Turns raw button state into navigation actions. A press is a
//! released-to-pressed edge between two polls; holding a button does not
//! repeat.
//!
//! | Button       | Action                         |
//! |--------------|--------------------------------|
//! | Right / Down | next quote (wraps to first)    |
//! | Left / Up    | previous quote (wraps to last) |
//! | Select       | toggle change / percent        |

use tickerlcd_display::{Button, Buttons};

/// What a button press does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputAction {
    Next,
    Previous,
    ToggleMode,
}

impl InputAction {
    pub const fn for_button(button: Button) -> Self {
        match button {
            Button::Right | Button::Down => InputAction::Next,
            Button::Left | Button::Up => InputAction::Previous,
            Button::Select => InputAction::ToggleMode,
        }
    }
}

/// How the second line shows the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Absolute change since the previous close
    #[default]
    Change,
    /// Change as a percentage of the previous close
    Percent,
}

impl DisplayMode {
    pub fn toggle(&mut self) {
        *self = match self {
            DisplayMode::Change => DisplayMode::Percent,
            DisplayMode::Percent => DisplayMode::Change,
        };
    }
}

/// Index of the quote on screen
///
/// Always in `0..count`; moving past either end wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    index: usize,
    count: usize,
}

impl Cursor {
    /// Cursor at the first of `count` entries
    pub const fn new(count: usize) -> Self {
        Self { index: 0, count }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn count(&self) -> usize {
        self.count
    }

    pub fn step_forward(&mut self) {
        if self.count > 0 {
            self.index = (self.index + 1) % self.count;
        }
    }

    pub fn step_back(&mut self) {
        if self.count > 0 {
            self.index = if self.index == 0 {
                self.count - 1
            } else {
                self.index - 1
            };
        }
    }
}

/// Edge detector for the button port
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputHandler {
    held: Buttons,
}

impl InputHandler {
    pub const fn new() -> Self {
        Self {
            held: Buttons::NONE,
        }
    }

    /// Feed the buttons held now; returns the ones newly pressed
    pub fn update(&mut self, held: Buttons) -> Buttons {
        let pressed = held.pressed_since(self.held);
        self.held = held;
        pressed
    }

    /// Apply every newly pressed button to the cursor and display mode
    ///
    /// Returns true if any button was pressed.
    pub fn handle(&mut self, held: Buttons, cursor: &mut Cursor, mode: &mut DisplayMode) -> bool {
        let pressed = self.update(held);
        for button in pressed.iter() {
            match InputAction::for_button(button) {
                InputAction::Next => cursor.step_forward(),
                InputAction::Previous => cursor.step_back(),
                InputAction::ToggleMode => mode.toggle(),
            }
        }
        !pressed.is_empty()
    }
}
