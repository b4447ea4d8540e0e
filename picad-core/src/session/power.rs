//! Display power bookkeeping

/// Requested power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Check if this is the on state
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }

    /// The opposite state
    pub fn flipped(self) -> Self {
        match self {
            PowerState::On => PowerState::Off,
            PowerState::Off => PowerState::On,
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

/// What the display and backlight were last switched to
///
/// The backlight can be on with the display off, but switching the display
/// off always takes the backlight with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPower {
    pub display_on: bool,
    pub backlight_on: bool,
}

impl DisplayPower {
    /// Both display and backlight are on
    pub fn fully_on(&self) -> bool {
        self.display_on && self.backlight_on
    }

    /// Current display state
    pub fn display(&self) -> PowerState {
        self.display_on.into()
    }

    /// Current backlight state
    pub fn backlight(&self) -> PowerState {
        self.backlight_on.into()
    }
}
