//! Configuration type definitions
//!
//! These types represent the compiled-in ticker configuration: which
//! symbols to track, how often to fetch, and which backlight color goes
//! with which status.

use tickerlcd_display::Backlight;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum display name length (fits beside a price on a 16-column line)
pub const MAX_NAME_LEN: usize = 7;

/// Maximum lookup symbol length
pub const MAX_SYMBOL_LEN: usize = 12;

/// Maximum quote time length (`12:59pm`)
pub const MAX_TIME_LEN: usize = 7;

/// Default time between fetch cycles (5 minutes)
pub const DEFAULT_FETCH_INTERVAL_MS: u32 = 300_000;

/// Default hold-off after a button press (20 seconds)
pub const DEFAULT_QUIET_PERIOD_MS: u32 = 20_000;

/// One tracked symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SymbolConfig<'a> {
    /// Short display name (may be empty; the symbol is shown instead)
    pub name: &'a str,
    /// Lookup symbol sent to the quote service
    pub symbol: &'a str,
}

impl<'a> SymbolConfig<'a> {
    pub const fn new(name: &'a str, symbol: &'a str) -> Self {
        Self { name, symbol }
    }

    /// Check the entry against the record field limits (in bytes)
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.is_empty() {
            Err(ConfigError::EmptySymbol)
        } else if self.symbol.len() > MAX_SYMBOL_LEN {
            Err(ConfigError::SymbolTooLong)
        } else if self.name.len() > MAX_NAME_LEN {
            Err(ConfigError::NameTooLong)
        } else {
            Ok(())
        }
    }
}

/// Symbols tracked when nothing else is configured
pub const DEFAULT_SYMBOLS: [SymbolConfig<'static>; 4] = [
    SymbolConfig::new("MSFT", "MSFT"),
    SymbolConfig::new("Apple", "AAPL"),
    SymbolConfig::new("Gold", "GCJ13.CMX"),
    SymbolConfig::new("Euro", "EURUSD=X"),
];

/// Fetch timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Minimum time between the end of one fetch cycle and the next (ms)
    pub fetch_interval_ms: u32,
    /// Minimum time after a button press before a fetch may start (ms)
    pub quiet_period_ms: u32,
}

impl TimingConfig {
    pub const fn new(fetch_interval_ms: u32, quiet_period_ms: u32) -> Self {
        Self {
            fetch_interval_ms,
            quiet_period_ms,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_INTERVAL_MS, DEFAULT_QUIET_PERIOD_MS)
    }
}

/// Backlight color for each display status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BacklightScheme {
    /// Network setup and first fetch not yet complete
    pub initializing: Backlight,
    /// Fetch cycle in progress
    pub updating: Backlight,
    /// Selected quote is unchanged or up
    pub up: Backlight,
    /// Selected quote is down
    pub down: Backlight,
}

impl BacklightScheme {
    pub const fn new() -> Self {
        Self {
            initializing: Backlight::White,
            updating: Backlight::Blue,
            up: Backlight::Green,
            down: Backlight::Red,
        }
    }
}

impl Default for BacklightScheme {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Display name longer than `MAX_NAME_LEN`
    NameTooLong,
    /// Symbol longer than `MAX_SYMBOL_LEN`
    SymbolTooLong,
    /// Symbol is empty
    EmptySymbol,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NameTooLong => write!(f, "name longer than {} chars", MAX_NAME_LEN),
            ConfigError::SymbolTooLong => {
                write!(f, "symbol longer than {} chars", MAX_SYMBOL_LEN)
            }
            ConfigError::EmptySymbol => f.write_str("empty symbol"),
        }
    }
}
