//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware compiles its
//! values in from `quotes.toml`; everything here also has a default.

pub mod types;

pub use types::*;
