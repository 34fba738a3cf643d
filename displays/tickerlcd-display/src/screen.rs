//! Screen buffer types
//!
//! Provides a character-based screen buffer for the 16x2 LCD.

use heapless::String;

use crate::backend::{CharDisplay, DisplayError};

/// Number of character rows on the LCD
pub const SCREEN_ROWS: usize = 2;

/// Number of character columns on the LCD
pub const SCREEN_COLS: usize = 16;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Intended content of every LCD row
///
/// Two screens compare equal when they show the same text, which tells the
/// caller whether anything needs to be sent to the hardware.
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    lines: [String<LINE_LEN>; SCREEN_ROWS],
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
        }
    }

    /// Set the content of a specific row
    ///
    /// Text longer than the line is cut at `LINE_LEN` characters.
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            for ch in text.chars().take(LINE_LEN) {
                if line.push(ch).is_err() {
                    break;
                }
            }
        }
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Write every row to the display
    ///
    /// Rows are padded with spaces to the full width so that characters
    /// left over from a longer previous line are overwritten.
    pub fn render_to<D: CharDisplay + ?Sized>(&self, display: &mut D) -> Result<(), DisplayError> {
        for (row, line) in self.lines.iter().enumerate() {
            let mut padded: String<LINE_LEN> = String::new();
            for ch in line.chars() {
                let _ = padded.push(ch);
            }
            while padded.len() < LINE_LEN {
                if padded.push(' ').is_err() {
                    break;
                }
            }
            display.write_at(row as u8, 0, &padded)?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.lines.iter().map(|l| l.as_str())).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[{=str} | {=str}]", self.lines[0].as_str(), self.lines[1].as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlight::Backlight;
    use crate::glyph::Glyph;

    struct Recorder {
        rows: [String<32>; SCREEN_ROWS],
        writes: usize,
    }

    impl CharDisplay for Recorder {
        fn clear(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn write_at(&mut self, row: u8, _col: u8, text: &str) -> Result<(), DisplayError> {
            let line = self
                .rows
                .get_mut(row as usize)
                .ok_or(DisplayError::InvalidCoordinates)?;
            line.clear();
            line.push_str(text).map_err(|_| DisplayError::InvalidCoordinates)?;
            self.writes += 1;
            Ok(())
        }

        fn define_glyph(&mut self, _glyph: &Glyph) -> Result<(), DisplayError> {
            Ok(())
        }

        fn set_backlight(&mut self, _color: Backlight) -> Result<(), DisplayError> {
            Ok(())
        }

        fn dimensions(&self) -> (u8, u8) {
            (SCREEN_COLS as u8, SCREEN_ROWS as u8)
        }
    }

    #[test]
    fn test_set_line_truncates() {
        let mut screen = Screen::new();
        screen.set_line(0, "0123456789abcdefXYZ");
        assert_eq!(screen.get_line(0), Some("0123456789abcdef"));
    }

    #[test]
    fn test_set_line_out_of_range_ignored() {
        let mut screen = Screen::new();
        screen.set_line(5, "nope");
        assert_eq!(screen, Screen::new());
        assert_eq!(screen.get_line(5), None);
    }

    #[test]
    fn test_render_pads_rows() {
        let mut screen = Screen::new();
        screen.set_line(0, "MSFT");
        screen.set_line(1, "\u{0} +0.25");

        let mut display = Recorder {
            rows: core::array::from_fn(|_| String::new()),
            writes: 0,
        };
        screen.render_to(&mut display).unwrap();

        assert_eq!(display.writes, 2);
        assert_eq!(display.rows[0].as_str(), "MSFT            ");
        assert_eq!(display.rows[1].len(), SCREEN_COLS);
    }

    #[test]
    fn test_equal_screens_compare_by_text() {
        let mut a = Screen::new();
        let mut b = Screen::new();
        a.set_line(0, "Gold");
        b.set_line(0, "Gold");
        assert_eq!(a, b);
        b.set_line(1, "x");
        assert_ne!(a, b);
    }
}
