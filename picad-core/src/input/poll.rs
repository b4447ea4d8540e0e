//! Switch sampling state
//!
//! The panel is sampled on a fixed interval. Only the value seen at each
//! sample matters: a press and release that both fall between two samples
//! is never seen, which is what debounces the switches.

use super::buttons::NO_BUTTONS;
use crate::config::DEFAULT_POLL_INTERVAL_MS;

/// Poller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollerState {
    /// Not sampling
    Idle,
    /// Timer running, sampling every interval
    Polling,
}

/// Events driving the poller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollerEvent {
    /// Start the sampling timer
    Start,
    /// Stop the sampling timer
    Stop,
    /// A sample or handler failed; the loop has ended
    Fault,
}

impl PollerState {
    /// Process an event and return the next state
    pub fn transition(self, event: PollerEvent) -> Self {
        use PollerEvent::*;
        use PollerState::*;

        match (self, event) {
            (Idle, Start) => Polling,
            (Polling, Stop) => Idle,
            (Polling, Fault) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }

    /// Check if the sampling timer is running
    pub fn is_polling(&self) -> bool {
        matches!(self, PollerState::Polling)
    }
}

/// Change detector for the switch register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchDebouncer {
    last: u8,
}

impl SwitchDebouncer {
    /// Start from "nothing pressed"
    pub const fn new() -> Self {
        Self { last: NO_BUTTONS }
    }

    /// Feed one sample
    ///
    /// Returns the new value if it differs from the previous sample.
    pub fn observe(&mut self, sample: u8) -> Option<u8> {
        if sample == self.last {
            return None;
        }
        self.last = sample;
        Some(sample)
    }

    /// Last value observed
    pub fn last(&self) -> u8 {
        self.last
    }
}

impl Default for SwitchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

/// What an interval change requires of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntervalChange {
    /// Not polling; the value applies on the next start
    Stored,
    /// Polling; the timer must be stopped and restarted
    Restart,
}

/// Sampling state owned by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollState {
    /// Change detector
    pub debouncer: SwitchDebouncer,
    /// Sampling interval in ms
    pub interval_ms: u32,
    /// Timer state
    pub state: PollerState,
}

impl PollState {
    /// Idle state with the given interval
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            debouncer: SwitchDebouncer::new(),
            interval_ms,
            state: PollerState::Idle,
        }
    }

    /// Record a new interval
    pub fn set_interval(&mut self, interval_ms: u32) -> IntervalChange {
        self.interval_ms = interval_ms;
        if self.state.is_polling() {
            IntervalChange::Restart
        } else {
            IntervalChange::Stored
        }
    }

    /// Apply a state machine event
    pub fn apply(&mut self, event: PollerEvent) -> PollerState {
        self.state = self.state.transition(event);
        self.state
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_MS)
    }
}
