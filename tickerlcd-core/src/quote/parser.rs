//! Quote CSV line parser
//!
//! The quote service answers each request with a single line of
//! comma-separated fields in the order given by the request's format
//! string. Fields are consumed positionally; text fields may be wrapped in
//! double quotes. Columns the ticker does not use (open, high, low,
//! volume) are skipped.
//!
//! ```text
//! "4:00pm",150.25,+2.10,148.90,150.80,148.50,31200455
//!  time    price  change open  high   low    volume
//! ```

use heapless::String;

use crate::config::MAX_TIME_LEN;

/// Marker the provider uses for a value it does not have
const NOT_AVAILABLE: &str = "N/A";

/// Column layout of a quote response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldLayout {
    /// Format string sent with the request (`f=` parameter)
    pub format: &'static str,
    /// Column holding the echoed symbol, if any
    pub symbol: Option<u8>,
    /// Column holding the quote time
    pub time: u8,
    /// Column holding the last price
    pub price: u8,
    /// Column holding the change since the previous close
    pub change: u8,
    /// Number of columns a complete response carries
    pub fields: u8,
}

impl FieldLayout {
    /// Time, price, change, open, high, low, volume
    pub const DEFAULT: Self = Self {
        format: "t1l1c1ohgv",
        symbol: None,
        time: 0,
        price: 1,
        change: 2,
        fields: 7,
    };

    /// Symbol, price, date, time, change, open, high, low, volume
    pub const YAHOO_SL1D1T1C1OHGV: Self = Self {
        format: "sl1d1t1c1ohgv",
        symbol: Some(0),
        time: 3,
        price: 1,
        change: 4,
        fields: 9,
    };
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Values taken from one response line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuoteUpdate {
    pub quote_time: String<MAX_TIME_LEN>,
    pub price: f32,
    pub change: f32,
}

/// Response line parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line has fewer columns than the layout requires
    MissingField,
    /// Price or change is not a finite number
    InvalidNumber,
    /// Echoed symbol differs from the one requested
    SymbolMismatch,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::MissingField => f.write_str("response has too few fields"),
            ParseError::InvalidNumber => f.write_str("response field is not a number"),
            ParseError::SymbolMismatch => f.write_str("response is for another symbol"),
        }
    }
}

/// Iterator over the comma-separated fields of a line
///
/// Commas inside double quotes do not split. Yielded fields still carry
/// their quotes; see [`unquote`].
pub struct CsvFields<'a> {
    rest: Option<&'a str>,
}

impl<'a> CsvFields<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { rest: Some(line) }
    }
}

impl<'a> Iterator for CsvFields<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let mut in_quotes = false;

        for (i, byte) in rest.bytes().enumerate() {
            match byte {
                b'"' => in_quotes = !in_quotes,
                b',' if !in_quotes => {
                    self.rest = Some(&rest[i + 1..]);
                    return Some(&rest[..i]);
                }
                _ => {}
            }
        }

        self.rest = None;
        Some(rest)
    }
}

/// Trim whitespace and one pair of surrounding double quotes
pub fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Parse a price, rejecting anything that is not a finite number
fn parse_price(field: &str) -> Result<f32, ParseError> {
    let value: f32 = unquote(field)
        .parse()
        .map_err(|_| ParseError::InvalidNumber)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidNumber)
    }
}

/// Parse a change; the provider reports `N/A` for instruments without one
fn parse_change(field: &str) -> Result<f32, ParseError> {
    if unquote(field).eq_ignore_ascii_case(NOT_AVAILABLE) {
        return Ok(0.0);
    }
    parse_price(field)
}

/// Copy a quote time, cutting it at `MAX_TIME_LEN` characters
fn parse_time(field: &str) -> String<MAX_TIME_LEN> {
    let mut time = String::new();
    for ch in unquote(field).chars() {
        if time.push(ch).is_err() {
            break;
        }
    }
    time
}

/// Parse one response line
///
/// `symbol` is the symbol that was requested; it is only checked when the
/// layout has a symbol column. Nothing is returned unless every used column
/// parses, so a bad line can never partially overwrite a record.
pub fn parse_quote_line(
    line: &str,
    symbol: &str,
    layout: &FieldLayout,
) -> Result<QuoteUpdate, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let mut echoed = None;
    let mut time = None;
    let mut price = None;
    let mut change = None;
    let mut count = 0usize;

    for (index, field) in CsvFields::new(line).enumerate() {
        count = index + 1;
        let column = match u8::try_from(index) {
            Ok(column) => column,
            Err(_) => continue,
        };
        if Some(column) == layout.symbol {
            echoed = Some(field);
        }
        if column == layout.time {
            time = Some(field);
        }
        if column == layout.price {
            price = Some(field);
        }
        if column == layout.change {
            change = Some(field);
        }
    }

    if count < layout.fields as usize {
        return Err(ParseError::MissingField);
    }

    let (time, price, change) = match (time, price, change) {
        (Some(t), Some(p), Some(c)) => (t, p, c),
        _ => return Err(ParseError::MissingField),
    };

    if let Some(echoed) = echoed {
        if !unquote(echoed).eq_ignore_ascii_case(symbol) {
            return Err(ParseError::SymbolMismatch);
        }
    }

    Ok(QuoteUpdate {
        quote_time: parse_time(time),
        price: parse_price(price)?,
        change: parse_change(change)?,
    })
}
