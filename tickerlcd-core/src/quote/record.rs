//! Quote record
//!
//! One record per tracked symbol. The symbol and name are fixed at startup;
//! the time, price and change are overwritten by each successful fetch.

use heapless::String;

use super::parser::QuoteUpdate;
use crate::config::{ConfigError, SymbolConfig, MAX_NAME_LEN, MAX_SYMBOL_LEN, MAX_TIME_LEN};

/// Direction of the last reported change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trend {
    /// Change is zero or positive
    Up,
    /// Change is negative
    Down,
}

/// Latest known quote for one symbol
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuoteRecord {
    name: String<MAX_NAME_LEN>,
    symbol: String<MAX_SYMBOL_LEN>,
    quote_time: String<MAX_TIME_LEN>,
    price: f32,
    change: f32,
}

impl QuoteRecord {
    /// Create a record with no quote yet
    pub fn new(config: &SymbolConfig<'_>) -> Result<Self, ConfigError> {
        config.validate()?;
        let name = String::try_from(config.name).map_err(|_| ConfigError::NameTooLong)?;
        let symbol = String::try_from(config.symbol).map_err(|_| ConfigError::SymbolTooLong)?;

        Ok(Self {
            name,
            symbol,
            quote_time: String::new(),
            price: 0.0,
            change: 0.0,
        })
    }

    /// Placeholder used while a store is being filled
    pub(crate) fn empty() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            quote_time: String::new(),
            price: 0.0,
            change: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Provider timestamp of the last update (empty before the first one)
    pub fn quote_time(&self) -> &str {
        &self.quote_time
    }

    pub fn price(&self) -> f32 {
        self.price
    }

    pub fn change(&self) -> f32 {
        self.change
    }

    /// Text shown on the display: the name, or the symbol if no name is set
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }

    pub fn trend(&self) -> Trend {
        if self.change < 0.0 {
            Trend::Down
        } else {
            Trend::Up
        }
    }

    /// Previous close implied by the current price and change
    pub fn prior_close(&self) -> f32 {
        self.price - self.change
    }

    /// Change as a percentage of the previous close
    ///
    /// Returns `None` when the previous close is zero.
    pub fn percent_change(&self) -> Option<f32> {
        let prior = self.prior_close();
        if prior == 0.0 {
            return None;
        }
        let percent = self.change / prior * 100.0;
        percent.is_finite().then_some(percent)
    }

    /// Overwrite time, price and change with a parsed update
    pub fn apply(&mut self, update: &QuoteUpdate) {
        self.quote_time.clone_from(&update.quote_time);
        self.price = update.price;
        self.change = update.change;
    }
}
