//! Character display and button abstractions for tickerlcd
//!
//! This crate provides:
//! - `CharDisplay` trait for HD44780-style character displays
//! - `ButtonSource` trait and the `Buttons` set for front-panel keys
//! - `Backlight` colors for RGB backlit modules
//! - A two-line `Screen` buffer and the custom arrow glyphs
//!
//! # Architecture
//!
//! The controller logic in `tickerlcd-core` builds a `Screen` and hands it
//! to whatever `CharDisplay` the board provides. Drivers in
//! `tickerlcd-drivers` implement these traits for real hardware; tests
//! implement them with in-memory fakes.

#![no_std]

pub mod backend;
pub mod backlight;
pub mod glyph;
pub mod input;
pub mod screen;

// Re-export key types
pub use backend::{CharDisplay, DisplayError};
pub use backlight::Backlight;
pub use glyph::{Glyph, GLYPH_DOWN, GLYPH_UP};
pub use input::{Button, ButtonSource, Buttons};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
