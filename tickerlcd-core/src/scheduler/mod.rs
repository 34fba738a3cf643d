//! Fetch scheduler
//!
//! Decides when the next fetch cycle runs. A cycle is due once the fetch
//! interval has passed since the last one, unless a button was pressed
//! within the quiet period.

pub mod fetch;

pub use fetch::{fetch_due, FetchScheduler};
