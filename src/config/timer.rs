//! Pulse timer configuration.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::hal::LinearPeriodMap;

/// Timer period range from TOML, in timer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    /// Period at maximum speed.
    #[serde(default = "default_fastest")]
    pub fastest_period: u32,

    /// Period at minimum speed.
    #[serde(default = "default_slowest")]
    pub slowest_period: u32,
}

fn default_fastest() -> u32 {
    LinearPeriodMap::DEFAULT_FASTEST
}

fn default_slowest() -> u32 {
    LinearPeriodMap::DEFAULT_SLOWEST
}

impl TimerConfig {
    /// Check if the range is usable (fastest < slowest).
    pub fn is_valid(&self) -> bool {
        self.fastest_period < self.slowest_period
    }

    /// Build the linear speed-to-period mapping.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPeriodRange` if the range is empty or inverted.
    pub fn period_map(&self) -> Result<LinearPeriodMap, ConfigError> {
        LinearPeriodMap::new(self.fastest_period, self.slowest_period)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            fastest_period: default_fastest(),
            slowest_period: default_slowest(),
        }
    }
}
