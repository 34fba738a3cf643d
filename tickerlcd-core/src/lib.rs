//! Board-agnostic core logic for the stock ticker firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Quote records, the fixed-size quote store and the CSV line parser
//! - Fetch scheduling (interval plus quiet period after button presses)
//! - Display phase state machine and backlight status selection
//! - Button handling (cursor, display mode)
//! - Screen rendering for the 16x2 LCD
//! - The controller that runs one main-loop iteration at a time
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod input;
pub mod quote;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod traits;

pub use controller::{Controller, CycleReport};
