//! Per-symbol fetch outcome errors

use super::parser::ParseError;
use crate::traits::FetchError;

/// Why a symbol was not updated in a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QuoteError {
    /// The quote service could not be reached or answered badly
    Fetch(FetchError),
    /// The response line did not match the field layout
    Parse(ParseError),
}

impl From<FetchError> for QuoteError {
    fn from(err: FetchError) -> Self {
        QuoteError::Fetch(err)
    }
}

impl From<ParseError> for QuoteError {
    fn from(err: ParseError) -> Self {
        QuoteError::Parse(err)
    }
}

impl core::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QuoteError::Fetch(err) => write!(f, "fetch failed: {}", err),
            QuoteError::Parse(err) => write!(f, "bad response: {}", err),
        }
    }
}
