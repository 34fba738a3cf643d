//! Events that trigger phase transitions

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A fetch cycle over all symbols is starting
    CycleStarted,
    /// The fetch cycle ran to completion (whatever the per-symbol results)
    CycleFinished,
}

