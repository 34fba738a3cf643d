//! Screen rendering
//!
//! Builds the two LCD lines for the quote under the cursor.
//!
//! ```text
//! +----------------+
//! |Apple     150.25|   label left, price right
//! |^ +2.10   4:00pm|   trend glyph, change (or %), quote time
//! +----------------+
//! ```
//!
//! When a line gets too long the label gives way to the price and the
//! quote time is dropped before the change. A number that still does not
//! fit is shown as `OVERFLOW_MARK`.

use core::fmt::{self, Write};

use heapless::String;
use tickerlcd_display::screen::LINE_LEN;
use tickerlcd_display::{Screen, GLYPH_DOWN, GLYPH_UP};

use crate::input::DisplayMode;
use crate::quote::{QuoteRecord, Trend};

/// One display line
pub type Line = String<LINE_LEN>;

/// Boot banner, first line
pub const BANNER_TITLE: &str = "Stock Ticker";

/// Boot banner, second line while the first quotes load
pub const BANNER_LOADING: &str = "Loading quotes..";

/// Shown in place of a number too wide for its column
pub const OVERFLOW_MARK: &str = "####";

/// Scratch size for formatting; holds any finite `f32` with 2 decimals
const NUMBER_BUF_LEN: usize = 48;

/// Format a number into at most `room` characters, or `OVERFLOW_MARK`
fn number(args: fmt::Arguments<'_>, room: usize) -> Line {
    let mut text: String<NUMBER_BUF_LEN> = String::new();
    let fits = text.write_fmt(args).is_ok() && text.len() <= room;
    let shown = if fits { text.as_str() } else { OVERFLOW_MARK };
    shown.chars().take(room).collect()
}

/// Render the boot banner
pub fn render_banner(screen: &mut Screen, status: &str) {
    screen.set_line(0, BANNER_TITLE);
    screen.set_line(1, status);
}

/// Render a quote record
pub fn render_quote(screen: &mut Screen, record: &QuoteRecord, mode: DisplayMode) {
    screen.set_line(0, &price_line(record));
    screen.set_line(1, &change_line(record, mode));
}

/// `label ... price`
pub fn price_line(record: &QuoteRecord) -> Line {
    let price = number(format_args!("{:.2}", record.price()), LINE_LEN);

    let room = LINE_LEN.saturating_sub(price.chars().count() + 1);
    let label: Line = record.label().chars().take(room).collect();

    justify(&label, &price)
}

/// `glyph change ... time`
pub fn change_line(record: &QuoteRecord, mode: DisplayMode) -> Line {
    let glyph = match record.trend() {
        Trend::Up => GLYPH_UP.as_char(),
        Trend::Down => GLYPH_DOWN.as_char(),
    };

    let mut left: Line = String::new();
    let _ = left.push(glyph);
    let _ = left.push(' ');

    // Avoid "-0.00" for a negative zero
    let change = if record.change() == 0.0 { 0.0 } else { record.change() };
    let room = LINE_LEN - left.len();
    let value = match mode {
        DisplayMode::Change => number(format_args!("{:+.2}", change), room),
        DisplayMode::Percent => match record.percent_change() {
            Some(percent) => {
                let percent = if percent == 0.0 { 0.0 } else { percent };
                number(format_args!("{:+.2}%", percent), room)
            }
            None => number(format_args!("n/a"), room),
        },
    };
    let _ = left.push_str(&value);

    let time = record.quote_time();
    if left.chars().count() + 1 + time.chars().count() <= LINE_LEN {
        justify(&left, time)
    } else {
        left
    }
}

/// Place `left` at column 0 and `right` against the last column
///
/// If both do not fit, `right` wins and `left` is cut.
fn justify(left: &str, right: &str) -> Line {
    let right_len = right.chars().count().min(LINE_LEN);
    let left_room = LINE_LEN - right_len;

    let mut line: Line = String::new();
    for ch in left.chars().take(left_room) {
        let _ = line.push(ch);
    }
    while line.chars().count() < left_room {
        if line.push(' ').is_err() {
            break;
        }
    }
    for ch in right.chars().take(right_len) {
        let _ = line.push(ch);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbolConfig;
    use crate::quote::QuoteUpdate;

    fn record(name: &str, time: &str, price: f32, change: f32) -> QuoteRecord {
        let mut record = QuoteRecord::new(&SymbolConfig::new(name, "SYM")).unwrap();
        record.apply(&QuoteUpdate {
            quote_time: String::try_from(time).unwrap(),
            price,
            change,
        });
        record
    }

    #[test]
    fn test_price_line_layout() {
        let line = price_line(&record("Apple", "4:00pm", 150.25, 2.10));
        assert_eq!(line.as_str(), "Apple     150.25");
    }

    #[test]
    fn test_change_line_up() {
        let line = change_line(&record("Apple", "4:00pm", 150.25, 2.10), DisplayMode::Change);
        assert_eq!(line.as_str(), "\u{0} +2.10   4:00pm");
    }

    #[test]
    fn test_change_line_down_percent() {
        let line = change_line(&record("Gold", "1:15pm", 99.0, -1.0), DisplayMode::Percent);
        assert_eq!(line.as_str(), "\u{1} -1.00%  1:15pm");
    }

    #[test]
    fn test_percent_of_prior_close() {
        let line = change_line(&record("T", "", 102.10, 2.10), DisplayMode::Percent);
        assert!(line.starts_with("\u{0} +2.10%"));
    }

    #[test]
    fn test_percent_without_prior_close() {
        let line = change_line(&record("T", "", 0.0, 0.0), DisplayMode::Percent);
        assert_eq!(line.trim_end(), "\u{0} n/a");
        assert_eq!(line.len(), LINE_LEN);
    }

    #[test]
    fn test_long_label_gives_way_to_price() {
        let mut rec = QuoteRecord::new(&SymbolConfig::new("", "GCJ13.CMX")).unwrap();
        rec.apply(&QuoteUpdate {
            quote_time: String::new(),
            price: 1593.20,
            change: 0.0,
        });
        let line = price_line(&rec);
        assert_eq!(line.len(), LINE_LEN);
        assert!(line.ends_with("1593.20"));
        assert!(line.starts_with("GCJ13.CM"));
    }

    #[test]
    fn test_wide_change_drops_time() {
        let line = change_line(
            &record("X", "12:59pm", 100.0, -12345.67),
            DisplayMode::Change,
        );
        assert_eq!(line.as_str(), "\u{1} -12345.67");
    }

    #[test]
    fn test_huge_price_shows_overflow_mark() {
        let line = price_line(&record("Apple", "4:00pm", 1e16, 0.0));
        assert_eq!(line.as_str(), "Apple       ####");

        // "999999986991104.00" is 18 chars, not cut to a misleading value
        let line = price_line(&record("Apple", "4:00pm", 1e15, 0.0));
        assert_eq!(line.as_str(), "Apple       ####");
    }

    #[test]
    fn test_widest_fitting_price_is_kept() {
        let line = price_line(&record("Apple", "4:00pm", 999_999_995_904.0, 0.0));
        assert_eq!(line.as_str(), " 999999995904.00");
    }

    #[test]
    fn test_huge_change_shows_overflow_mark() {
        let line = change_line(&record("X", "4:00pm", 1.0, -1e15), DisplayMode::Change);
        assert_eq!(line.as_str(), "\u{1} ####    4:00pm");
    }

    #[test]
    fn test_banner() {
        let mut screen = Screen::new();
        render_banner(&mut screen, BANNER_LOADING);
        assert_eq!(screen.get_line(0), Some(BANNER_TITLE));
        assert_eq!(screen.get_line(1), Some(BANNER_LOADING));
    }
}
