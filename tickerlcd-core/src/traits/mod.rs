//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations. Display and button traits live
//! in `tickerlcd-display` and are re-exported here.

pub mod clock;
pub mod network;

pub use clock::Clock;
pub use network::{FetchError, QuoteSource};
pub use tickerlcd_display::{ButtonSource, CharDisplay, DisplayError};
