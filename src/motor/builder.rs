//! Builder pattern for MotionController.

use crate::config::{MotorConfig, StepLimits, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{DirectionEnable, LinearPeriodMap, PeriodMap, PulseGenerator};
use crate::motion::{CurveScale, RampSettings, RemainderLeg};

use super::controller::MotionController;

/// Builder for creating MotionController instances.
pub struct MotionControllerBuilder<PULSE, STAGE, MAP = LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    pulse: Option<PULSE>,
    stage: Option<STAGE>,
    period_map: MAP,
    ramp_steps: u16,
    remainder: RemainderLeg,
    scale: CurveScale,
    limits: Option<StepLimits>,
    period_error: Option<ConfigError>,
}

impl<PULSE, STAGE> Default for MotionControllerBuilder<PULSE, STAGE, LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<PULSE, STAGE> MotionControllerBuilder<PULSE, STAGE, LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            pulse: None,
            stage: None,
            period_map: LinearPeriodMap::default(),
            ramp_steps: RampSettings::DEFAULT_RAMP_STEPS,
            remainder: RemainderLeg::default(),
            scale: CurveScale::default(),
            limits: None,
            period_error: None,
        }
    }

    /// Configure from a MotorConfig.
    ///
    /// Pin polarity settings belong to the driver stage; apply them with
    /// [`GpioDriverStage::with_config`](crate::hal::GpioDriverStage::with_config).
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.ramp_steps = config.ramp_steps;
        self.remainder = config.remainder_leg;
        self.scale = config.curve_scale;
        self.limits = config.limits;
        match config.timer.period_map() {
            Ok(map) => self.period_map = map,
            Err(e) => self.period_error = Some(e),
        }
        self
    }

    /// Configure from SystemConfig by motor name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MotorNotFound` if the name is not configured.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.motor(motor_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_motor_config(motor_config))
    }
}

impl<PULSE, STAGE, MAP> MotionControllerBuilder<PULSE, STAGE, MAP>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    /// Set the pulse generator.
    pub fn pulse_generator(mut self, pulse: PULSE) -> Self {
        self.pulse = Some(pulse);
        self
    }

    /// Set the driver stage.
    pub fn driver_stage(mut self, stage: STAGE) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Replace the speed-to-period mapping.
    pub fn period_map<M: PeriodMap>(self, period_map: M) -> MotionControllerBuilder<PULSE, STAGE, M> {
        MotionControllerBuilder {
            pulse: self.pulse,
            stage: self.stage,
            period_map,
            ramp_steps: self.ramp_steps,
            remainder: self.remainder,
            scale: self.scale,
            limits: self.limits,
            period_error: None,
        }
    }

    /// Set the full ramp length in steps.
    pub fn ramp_steps(mut self, steps: u16) -> Self {
        self.ramp_steps = steps;
        self
    }

    /// Set which leg of a short move receives the odd step.
    pub fn remainder_leg(mut self, remainder: RemainderLeg) -> Self {
        self.remainder = remainder;
        self
    }

    /// Set how ramp positions are normalized on the speed curve.
    pub fn curve_scale(mut self, scale: CurveScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set soft limits.
    pub fn limits(mut self, limits: StepLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Build the MotionController.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or a setting is invalid.
    pub fn build(self) -> Result<MotionController<PULSE, STAGE, MAP>> {
        if let Some(e) = self.period_error {
            return Err(e.into());
        }

        let pulse = self
            .pulse
            .ok_or(ConfigError::MissingField("pulse_generator"))?;
        let stage = self.stage.ok_or(ConfigError::MissingField("driver_stage"))?;

        let settings = RampSettings::new(self.ramp_steps)?
            .with_remainder(self.remainder)
            .with_scale(self.scale);

        if let Some(ref limits) = self.limits {
            if !limits.is_valid() {
                return Err(ConfigError::InvalidSoftLimits {
                    min: limits.min_steps,
                    max: limits.max_steps,
                }
                .into());
            }
        }

        Ok(MotionController::new(
            pulse,
            stage,
            self.period_map,
            settings,
            self.limits,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Speed, Steps};
    use crate::config::{LimitPolicy, TimerConfig};
    use crate::motion::Direction;
    use crate::motor::Armed;

    struct NullTimer(u32);

    impl PulseGenerator for NullTimer {
        fn start(&mut self) {}
        fn stop(&mut self) {}
        fn set_period(&mut self, period: u32) {
            self.0 = period;
        }
    }

    struct NullStage;

    impl DirectionEnable for NullStage {
        type Error = core::convert::Infallible;

        fn set_direction(&mut self, _: Direction) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
        fn set_enabled(&mut self, _: bool) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
        fn set_power(&mut self, _: bool) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_pulse_generator() {
        let result = MotionControllerBuilder::<NullTimer, NullStage>::new()
            .driver_stage(NullStage)
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("pulse_generator")))
        ));
    }

    #[test]
    fn test_zero_ramp_rejected() {
        let result = MotionControllerBuilder::new()
            .pulse_generator(NullTimer(0))
            .driver_stage(NullStage)
            .ramp_steps(0)
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidRampSteps(0)))
        ));
    }

    #[test]
    fn test_from_motor_config() {
        let mut config = MotorConfig::named("lift").unwrap();
        config.ramp_steps = 10;
        config.timer = TimerConfig {
            fastest_period: 100,
            slowest_period: 1100,
        };
        config.limits = Some(StepLimits::new(0, 1000, LimitPolicy::Reject));

        let mut motor = MotionControllerBuilder::new()
            .from_motor_config(&config)
            .pulse_generator(NullTimer(0))
            .driver_stage(NullStage)
            .build()
            .unwrap();

        assert_eq!(motor.snapshot().settings().ramp_steps(), 10);
        assert!(motor.limits().is_some());

        // A one-step move runs its only pulse at full speed.
        assert_eq!(motor.set_target(Steps(1)).unwrap(), Armed::Started(Speed::MAX));
        assert_eq!(motor.pulse_generator().0, 100);
    }

    #[test]
    fn test_invalid_timer_range_from_config() {
        let mut config = MotorConfig::named("lift").unwrap();
        config.timer = TimerConfig {
            fastest_period: 100,
            slowest_period: 100,
        };

        let result = MotionControllerBuilder::new()
            .from_motor_config(&config)
            .pulse_generator(NullTimer(0))
            .driver_stage(NullStage)
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidPeriodRange { .. }))
        ));
    }

    #[test]
    fn test_custom_period_map() {
        let mut motor = MotionControllerBuilder::new()
            .pulse_generator(NullTimer(0))
            .driver_stage(NullStage)
            .period_map(|speed: Speed| 50_000 / (u32::from(speed.value()) + 1))
            .build()
            .unwrap();

        motor.set_target(Steps(1)).unwrap();
        assert_eq!(motor.pulse_generator().0, 50_000 / 10_001);
    }

    #[test]
    fn test_from_config_unknown_motor() {
        let config = SystemConfig::default();
        let result = MotionControllerBuilder::<NullTimer, NullStage>::new().from_config(&config, "z");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MotorNotFound(_)))
        ));
    }
}
