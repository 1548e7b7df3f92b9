//! Interrupt-driven motion controller.
//!
//! Generic over the board's pulse generator, driver stage and period mapping.

use crate::config::units::{Speed, Steps};
use crate::config::StepLimits;
use crate::error::{Error, MotionError, MotorError, Result};
use crate::hal::{DirectionEnable, LinearPeriodMap, PeriodMap, PulseGenerator};
use crate::motion::{Direction, MotionPhase, MotionProfile, RampSettings};

use super::builder::MotionControllerBuilder;
use super::state::{MotorState, NextAction};

/// Outcome of an accepted [`MotionController::set_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Armed {
    /// Already at the requested position; nothing was started.
    AtTarget,
    /// Pulse generation started at this speed.
    Started(Speed),
}

/// Stepper motion controller.
///
/// Generic over:
/// - `PULSE`: timer producing step pulses (must implement [`PulseGenerator`])
/// - `STAGE`: direction/enable/power lines (must implement [`DirectionEnable`])
/// - `MAP`: speed-to-period translation (defaults to [`LinearPeriodMap`])
///
/// Call [`advance`](Self::advance) from the pulse-complete interrupt and
/// everything else from thread context. The controller does no locking of its
/// own: the caller must keep the interrupt from running during `set_target`,
/// for example by holding the controller in a
/// [`SharedController`](super::SharedController).
pub struct MotionController<PULSE, STAGE, MAP = LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    pulse: PULSE,
    stage: STAGE,
    period_map: MAP,
    state: MotorState,
    limits: Option<StepLimits>,
}

impl<PULSE, STAGE> MotionController<PULSE, STAGE, LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
{
    /// Start building a controller.
    pub fn builder() -> MotionControllerBuilder<PULSE, STAGE, LinearPeriodMap> {
        MotionControllerBuilder::new()
    }
}

impl<PULSE, STAGE, MAP> MotionController<PULSE, STAGE, MAP>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    /// Create an idle controller at position 0.
    pub fn new(
        pulse: PULSE,
        stage: STAGE,
        period_map: MAP,
        settings: RampSettings,
        limits: Option<StepLimits>,
    ) -> Self {
        Self {
            pulse,
            stage,
            period_map,
            state: MotorState::new(settings),
            limits,
        }
    }

    /// Request a move to an absolute position.
    ///
    /// On success the driver stage is powered, enabled and pointed in the
    /// right direction, the first period is programmed and the pulse
    /// generator is running.
    ///
    /// # Errors
    ///
    /// - `MotionError::Busy` if a move is in progress
    /// - `MotorError::LimitExceeded` if the target violates `Reject` soft limits
    /// - `MotionError::Overflow` if the distance does not fit the step counters
    /// - `MotorError::PinError` if a driver-stage line could not be written
    ///
    /// The state is left untouched on every error. If a driver-stage line
    /// fails part way through arming, the lines already switched on are
    /// switched off again.
    pub fn set_target(&mut self, target: Steps) -> Result<Armed> {
        if !self.state.is_idle() {
            warn!("motor is running, rejecting target {}", target.0);
            return Err(MotionError::Busy.into());
        }

        let target = self.apply_limits(target)?;

        let Some(profile) = MotionProfile::plan(self.state.position(), target, self.state.settings())?
        else {
            debug!("already at target {}", target.0);
            return Ok(Armed::AtTarget);
        };

        if let Err(e) = self.arm_stage(profile.direction) {
            if self.release_stage().is_err() {
                warn!("driver stage did not release after failed arm");
            }
            return Err(e);
        }

        let speed = self.state.begin(&profile, target);
        debug!(
            "move {} -> {}: accel {} cruise {} decel {}",
            self.state.position().0,
            target.0,
            profile.accel_steps,
            profile.cruise_steps,
            profile.decel_steps
        );

        self.pulse.set_period(self.period_map.period(speed));
        self.pulse.start();

        Ok(Armed::Started(speed))
    }

    /// Handle one completed pulse.
    ///
    /// Must be called exactly once per pulse, normally from the timer
    /// interrupt. Constant time; at most one cosine evaluation. On
    /// `Continue` the next period is already programmed; on `Stop` the
    /// generator is halted and the driver stage released.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the driver stage could not be
    /// released. The move is over regardless.
    pub fn advance(&mut self) -> Result<NextAction> {
        if self.state.is_idle() {
            self.pulse.stop();
            return Ok(NextAction::Stop);
        }

        match self.state.advance() {
            NextAction::Continue(speed) => {
                self.pulse.set_period(self.period_map.period(speed));
                Ok(NextAction::Continue(speed))
            }
            NextAction::Stop => {
                self.release()?;
                Ok(NextAction::Stop)
            }
        }
    }

    /// Stop immediately, from any phase.
    ///
    /// The state is forced idle before any hardware is touched, so it is
    /// consistent even if a pin write fails. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the driver stage could not be released.
    pub fn emergency_stop(&mut self) -> Result<()> {
        warn!(
            "emergency stop at pos {} ({} pulses into move)",
            self.state.position().0,
            self.state.pulses()
        );
        self.state.halt();
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        self.pulse.stop();
        self.pulse.set_period(self.period_map.period(Speed::MIN));
        self.release_stage()
    }

    fn arm_stage(&mut self, direction: Direction) -> Result<()> {
        self.stage.set_power(true).map_err(|_| MotorError::PinError)?;
        self.stage.set_enabled(true).map_err(|_| MotorError::PinError)?;
        self.stage
            .set_direction(direction)
            .map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    /// Disable and power down, attempting both writes; reports the first failure.
    fn release_stage(&mut self) -> Result<()> {
        let disabled = self.stage.set_enabled(false);
        let unpowered = self.stage.set_power(false);
        disabled
            .and(unpowered)
            .map_err(|_| Error::Motor(MotorError::PinError))
    }

    fn apply_limits(&self, target: Steps) -> Result<Steps> {
        match self.limits {
            None => Ok(target),
            Some(ref limits) => limits.apply(target).ok_or_else(|| {
                MotorError::LimitExceeded {
                    position: target.0,
                    limit: limits.nearest(target),
                }
                .into()
            }),
        }
    }

    /// Current absolute position in steps.
    #[inline]
    pub fn current_position(&self) -> Steps {
        self.state.position()
    }

    /// Redefine the current position, e.g. after homing.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::Busy` if a move is in progress.
    pub fn set_current_position(&mut self, position: Steps) -> Result<()> {
        if !self.state.is_idle() {
            return Err(MotionError::Busy.into());
        }
        self.state.set_position(position);
        Ok(())
    }

    /// Current motion phase.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.state.phase()
    }

    /// Check if a move is in progress.
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.state.is_idle()
    }

    /// Copy of the motor state for logging or telemetry.
    #[inline]
    pub fn snapshot(&self) -> MotorState {
        self.state
    }

    /// Soft limits, if configured.
    #[inline]
    pub fn limits(&self) -> Option<&StepLimits> {
        self.limits.as_ref()
    }

    /// Get the pulse generator.
    pub fn pulse_generator(&self) -> &PULSE {
        &self.pulse
    }

    /// Get the driver stage.
    pub fn driver_stage(&self) -> &STAGE {
        &self.stage
    }

    /// Take the hardware back.
    pub fn release_hardware(self) -> (PULSE, STAGE, MAP) {
        (self.pulse, self.stage, self.period_map)
    }
}
