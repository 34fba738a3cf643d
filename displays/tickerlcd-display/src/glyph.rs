//! Custom 5x8 glyphs
//!
//! HD44780-compatible controllers have eight CGRAM slots. Writing the
//! character code of a slot (0-7) displays the uploaded bitmap.

/// Number of user-definable glyph slots
pub const GLYPH_SLOTS: u8 = 8;

/// A custom character bitmap
///
/// Each row uses the low 5 bits, MSB on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    /// CGRAM slot (0-7)
    pub slot: u8,
    /// Pixel rows, top to bottom
    pub rows: [u8; 8],
}

impl Glyph {
    /// Character that displays this glyph when written as text
    pub const fn as_char(&self) -> char {
        self.slot as char
    }
}

/// Up arrow, shown when a quote is up on the day
pub const GLYPH_UP: Glyph = Glyph {
    slot: 0,
    rows: [
        0b00000, //
        0b00100, //   #
        0b01110, //  ###
        0b11111, // #####
        0b01110, //  ###
        0b01110, //  ###
        0b01110, //  ###
        0b00000, //
    ],
};

/// Down arrow, shown when a quote is down on the day
pub const GLYPH_DOWN: Glyph = Glyph {
    slot: 1,
    rows: [
        0b00000, //
        0b01110, //  ###
        0b01110, //  ###
        0b01110, //  ###
        0b11111, // #####
        0b01110, //  ###
        0b00100, //   #
        0b00000, //
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_fit_cgram() {
        for glyph in [GLYPH_UP, GLYPH_DOWN] {
            assert!(glyph.slot < GLYPH_SLOTS);
            assert!(glyph.rows.iter().all(|row| row & !0x1F == 0));
        }
    }

    #[test]
    fn test_arrows_are_mirror_images() {
        let mut flipped = GLYPH_UP.rows;
        flipped[1..7].reverse();
        assert_eq!(flipped, GLYPH_DOWN.rows);
    }

    #[test]
    fn test_glyph_char_is_slot_code() {
        assert_eq!(GLYPH_UP.as_char(), '\u{0}');
        assert_eq!(GLYPH_DOWN.as_char(), '\u{1}');
    }
}
