//! Uptime clock backed by the embassy time driver

use embassy_time::Instant;
use tickerlcd_core::traits::Clock;

/// Milliseconds since boot, truncated to the wrapping 32-bit counter
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
