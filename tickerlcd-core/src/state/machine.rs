//! Phase state machine definition
//!
//! The backlight status is a function of the current phase and the trend of
//! the quote on screen.

use tickerlcd_display::Backlight;

use super::events::Event;
use crate::config::BacklightScheme;
use crate::quote::Trend;

/// Ticker phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Power-on: network setup, no fetch cycle started yet
    #[default]
    Initializing,
    /// Fetch cycle in progress
    Fetching,
    /// Showing the results of the last cycle
    Ready,
}

/// Backlight status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Initializing,
    Updating,
    Up,
    Down,
}

impl Status {
    /// Backlight color for this status
    pub fn color(self, scheme: &BacklightScheme) -> Backlight {
        match self {
            Status::Initializing => scheme.initializing,
            Status::Updating => scheme.updating,
            Status::Up => scheme.up,
            Status::Down => scheme.down,
        }
    }
}

impl Phase {
    /// Process an event and return the next phase
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Phase::*;

        match (self, event) {
            (Initializing, CycleStarted) => Fetching,
            (Ready, CycleStarted) => Fetching,
            (Fetching, CycleFinished) => Ready,

            // Default: stay in current phase
            _ => self,
        }
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, Phase::Fetching)
    }

    /// Backlight status for this phase
    ///
    /// `trend` is the trend of the quote on screen. A running fetch
    /// overrides it.
    pub fn status(&self, trend: Trend) -> Status {
        match self {
            Phase::Initializing => Status::Initializing,
            Phase::Fetching => Status::Updating,
            Phase::Ready => match trend {
                Trend::Up => Status::Up,
                Trend::Down => Status::Down,
            },
        }
    }
}
