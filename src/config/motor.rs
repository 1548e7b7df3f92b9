//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::motion::{CurveScale, RampSettings, RemainderLeg};

use super::limits::StepLimits;
use super::timer::TimerConfig;

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Steps in a full acceleration or deceleration ramp.
    #[serde(default = "default_ramp_steps")]
    pub ramp_steps: u16,

    /// Which leg of a short move receives the odd step.
    #[serde(default)]
    pub remainder_leg: RemainderLeg,

    /// How ramp positions are normalized on the speed curve.
    #[serde(default)]
    pub curve_scale: CurveScale,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Driver is enabled by pulling ENABLE low.
    #[serde(default = "default_enable_active_low")]
    pub enable_active_low: bool,

    /// Pulse timer period range.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Optional soft limits.
    #[serde(default)]
    pub limits: Option<StepLimits>,
}

fn default_ramp_steps() -> u16 {
    RampSettings::DEFAULT_RAMP_STEPS
}

fn default_enable_active_low() -> bool {
    true
}

impl MotorConfig {
    /// Create a configuration with defaults for everything but the name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the name is longer than 32 bytes.
    pub fn named(name: &str) -> Result<Self, ConfigError> {
        let name = String::try_from(name).map_err(|_| {
            ConfigError::ParseError(String::try_from("motor name too long").unwrap_or_default())
        })?;
        Ok(Self {
            name,
            ramp_steps: default_ramp_steps(),
            remainder_leg: RemainderLeg::default(),
            curve_scale: CurveScale::default(),
            invert_direction: false,
            enable_active_low: default_enable_active_low(),
            timer: TimerConfig::default(),
            limits: None,
        })
    }

    /// Ramp settings described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRampSteps` if `ramp_steps` is zero.
    pub fn ramp_settings(&self) -> Result<RampSettings, ConfigError> {
        Ok(RampSettings::new(self.ramp_steps)?
            .with_remainder(self.remainder_leg)
            .with_scale(self.curve_scale))
    }
}
