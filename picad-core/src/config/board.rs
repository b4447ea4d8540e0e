//! Board configuration types
//!
//! Defaults match the PiFace Control and Display wiring: expander on SPI
//! bus 0, chip select 1, hardware address 0.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use picad_hal::MAX_HW_ADDRESS;

/// Default switch sampling interval
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 100;

/// HD44780 timing
///
/// The controller has no busy-flag readback on this board (RW is tied
/// low in practice), so every step waits a fixed time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LcdTiming {
    /// Enable pulse width, also held after the falling edge (µs)
    pub pulse_us: u32,
    /// Wait after every command or data byte (µs)
    pub settle_us: u32,
    /// Wait after clear display / return home (µs)
    pub clear_us: u32,
    /// Waits before each of the three 8-bit reset writes (µs)
    pub setup_us: [u32; 3],
}

impl LcdTiming {
    /// Timing used on the real board
    pub const BOARD: Self = Self {
        pulse_us: 1_000,
        settle_us: 1_000,
        clear_us: 3_000,
        setup_us: [15_000, 5_000, 1_000],
    };

    /// No waits at all, for driving mocks
    pub const ZERO: Self = Self {
        pulse_us: 0,
        settle_us: 0,
        clear_us: 0,
        setup_us: [0; 3],
    };
}

impl Default for LcdTiming {
    fn default() -> Self {
        Self::BOARD
    }
}

/// Board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    /// SPI bus the expander sits on
    pub bus: u8,
    /// SPI chip select line
    pub chip_select: u8,
    /// Expander hardware address (A2..A0)
    pub hw_address: u8,
    /// Switch sampling interval in ms
    pub poll_interval_ms: u32,
    /// LCD timing
    pub timing: LcdTiming,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            chip_select: 1,
            hw_address: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timing: LcdTiming::BOARD,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Hardware address above 7
    InvalidHwAddress(u8),
    /// Poll interval of zero
    ZeroPollInterval,
}

impl BoardConfig {
    /// Check values the hardware cannot accept
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hw_address > MAX_HW_ADDRESS {
            return Err(ConfigError::InvalidHwAddress(self.hw_address));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BoardConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.bus, 0);
        assert_eq!(config.chip_select, 1);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.timing, LcdTiming::BOARD);
    }

    #[test]
    fn test_rejects_bad_hw_address() {
        let config = BoardConfig {
            hw_address: 8,
            ..BoardConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidHwAddress(8)));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = BoardConfig {
            poll_interval_ms: 0,
            ..BoardConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }
}
