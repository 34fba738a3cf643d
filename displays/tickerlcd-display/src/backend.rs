//! Display backend trait
//!
//! Defines the interface for character displays.

use crate::backlight::Backlight;
use crate::glyph::Glyph;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display (bus NAK, arbitration loss)
    Communication,
    /// Invalid coordinates or glyph slot
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Communication => f.write_str("display bus error"),
            DisplayError::InvalidCoordinates => f.write_str("display position out of range"),
            DisplayError::NotInitialized => f.write_str("display not initialized"),
        }
    }
}

/// Character display backend
///
/// Provides a hardware-agnostic interface for text-mode displays with a
/// small number of user-definable glyphs and a colored backlight.
pub trait CharDisplay {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write text starting at the specified row and column
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number in characters (0-based)
    /// - `text`: Text to display. Characters `'\u{0}'..='\u{7}'` select
    ///   custom glyph slots.
    fn write_at(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Upload a custom glyph bitmap into a character generator slot
    fn define_glyph(&mut self, glyph: &Glyph) -> Result<(), DisplayError>;

    /// Set the backlight color
    fn set_backlight(&mut self, color: Backlight) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);
}
