//! Character LCD drivers

pub mod rgb_shield;

pub use rgb_shield::RgbLcdShield;
