//! Compiled-in configuration
//!
//! `build.rs` validates `quotes.toml` and generates the constants included
//! here. Edit `quotes.toml` and rebuild to change them.

use tickerlcd_core::config::{BacklightScheme, SymbolConfig, TimingConfig};
use tickerlcd_core::quote::FieldLayout;
use tickerlcd_display::Backlight;

include!(concat!(env!("OUT_DIR"), "/quotes.rs"));
