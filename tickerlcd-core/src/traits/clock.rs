//! Monotonic millisecond clock

/// Uptime clock
///
/// Returns milliseconds since boot as a wrapping 32-bit counter. Callers
/// compare readings with `wrapping_sub`, so the roll-over after ~49.7 days
/// is harmless.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
