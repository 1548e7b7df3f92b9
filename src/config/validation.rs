//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Ramp length is at least one step
/// - Timer period range is non-empty (fastest < slowest)
/// - Soft limits are valid (min < max)
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, motor) in config.motors.iter() {
        validate_motor(name.as_str(), motor)?;
    }

    Ok(())
}

pub(crate) fn validate_motor(name: &str, config: &super::MotorConfig) -> Result<()> {
    if config.ramp_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidRampSteps(config.ramp_steps)));
    }

    if !config.timer.is_valid() {
        return Err(Error::Config(ConfigError::InvalidPeriodRange {
            fastest: config.timer.fastest_period,
            slowest: config.timer.slowest_period,
        }));
    }

    if let Some(ref limits) = config.limits {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidSoftLimits {
                min: limits.min_steps,
                max: limits.max_steps,
            }));
        }
    }

    debug!("motor {} config ok", name);
    Ok(())
}
