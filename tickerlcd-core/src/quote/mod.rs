//! Quote data
//!
//! Records, the fixed-size store that holds them, and the parser that
//! turns a quote service response line into a record update.

pub mod error;
pub mod parser;
pub mod record;
pub mod store;

pub use error::QuoteError;
pub use parser::{parse_quote_line, FieldLayout, ParseError, QuoteUpdate};
pub use record::{QuoteRecord, Trend};
pub use store::QuoteStore;
