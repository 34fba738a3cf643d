//! Fetch timing
//!
//! Tracks when the last fetch cycle finished and when the user last
//! pressed a button. All times are readings of a wrapping millisecond
//! uptime counter.

use crate::config::TimingConfig;

/// Whether a fetch cycle should start now
///
/// True iff at least `fetch_interval_ms` has passed since `last_fetch_ms`
/// and at least `quiet_period_ms` has passed since `last_input_ms`.
pub fn fetch_due(now_ms: u32, last_fetch_ms: u32, last_input_ms: u32, timing: &TimingConfig) -> bool {
    now_ms.wrapping_sub(last_fetch_ms) >= timing.fetch_interval_ms
        && now_ms.wrapping_sub(last_input_ms) >= timing.quiet_period_ms
}

/// Fetch cycle scheduler
///
/// Before the first cycle has run the scheduler reports due immediately,
/// so quotes are loaded at boot.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchScheduler {
    timing: TimingConfig,
    /// Completion time of the last cycle (None until the first one)
    last_fetch_ms: Option<u32>,
    /// Time of the last recognized button press
    last_input_ms: Option<u32>,
}

impl FetchScheduler {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            last_fetch_ms: None,
            last_input_ms: None,
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Whether a fetch cycle should start at `now_ms`
    pub fn is_due(&self, now_ms: u32) -> bool {
        let Some(last_fetch) = self.last_fetch_ms else {
            return true;
        };
        match self.last_input_ms {
            Some(last_input) => fetch_due(now_ms, last_fetch, last_input, &self.timing),
            None => now_ms.wrapping_sub(last_fetch) >= self.timing.fetch_interval_ms,
        }
    }

    /// Record a button press
    pub fn record_input(&mut self, now_ms: u32) {
        self.last_input_ms = Some(now_ms);
    }

    /// Record the completion of a fetch cycle, successful or not
    pub fn record_fetch(&mut self, now_ms: u32) {
        self.last_fetch_ms = Some(now_ms);
    }

    pub fn last_fetch_ms(&self) -> Option<u32> {
        self.last_fetch_ms
    }

    pub fn last_input_ms(&self) -> Option<u32> {
        self.last_input_ms
    }

    /// Whether at least one cycle has completed
    pub fn has_fetched(&self) -> bool {
        self.last_fetch_ms.is_some()
    }
}
