//! Display phase state machine
//!
//! Tracks whether the ticker is still starting up, fetching quotes, or
//! showing fresh data, and maps that onto a backlight status.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{Phase, Status};
