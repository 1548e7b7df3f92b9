//! Motion profile partitioning.
//!
//! Splits a move into acceleration, cruise and deceleration step counts. Long
//! moves get a trapezoid (full ramps around a cruise at maximum speed); short
//! moves get a triangle that never cruises.

use core::fmt;
use core::num::NonZeroU16;

use serde::Deserialize;

use crate::config::units::Steps;
use crate::error::{ConfigError, MotionError};

use super::curve::CurveScale;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward larger positions.
    #[default]
    Forward,
    /// Toward smaller positions.
    Backward,
}

impl Direction {
    /// Direction needed to travel from `from` to `to`.
    #[inline]
    pub fn between(from: Steps, to: Steps) -> Self {
        if to.0 >= from.0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// Current phase of motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// At rest; both the initial and the terminal phase.
    #[default]
    Idle,
    /// Speeding up along the ease-in curve.
    Accelerating,
    /// Moving at maximum speed.
    Cruising,
    /// Slowing down along the ease-out curve.
    Decelerating,
}

impl fmt::Display for MotionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionPhase::Idle => f.write_str("idle"),
            MotionPhase::Accelerating => f.write_str("accelerating"),
            MotionPhase::Cruising => f.write_str("cruising"),
            MotionPhase::Decelerating => f.write_str("decelerating"),
        }
    }
}

/// Which leg of a short (triangular) move receives the odd step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum RemainderLeg {
    /// `decel = distance / 2`, acceleration gets the rest.
    #[default]
    Accelerate,
    /// `accel = distance / 2`, deceleration gets the rest.
    Decelerate,
}

/// Ramp tuning shared by every move of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampSettings {
    ramp_steps: NonZeroU16,
    remainder: RemainderLeg,
    scale: CurveScale,
}

impl RampSettings {
    /// Default ramp length in steps.
    pub const DEFAULT_RAMP_STEPS: u16 = 200;

    /// Create ramp settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRampSteps` if `ramp_steps` is zero.
    pub fn new(ramp_steps: u16) -> Result<Self, ConfigError> {
        let ramp_steps =
            NonZeroU16::new(ramp_steps).ok_or(ConfigError::InvalidRampSteps(ramp_steps))?;
        Ok(Self {
            ramp_steps,
            remainder: RemainderLeg::default(),
            scale: CurveScale::default(),
        })
    }

    /// Set which leg receives the odd step of a short move.
    pub fn with_remainder(mut self, remainder: RemainderLeg) -> Self {
        self.remainder = remainder;
        self
    }

    /// Set how ramp positions are normalized on the speed curve.
    pub fn with_scale(mut self, scale: CurveScale) -> Self {
        self.scale = scale;
        self
    }

    /// Steps in a full acceleration or deceleration ramp.
    #[inline]
    pub fn ramp_steps(&self) -> u32 {
        u32::from(self.ramp_steps.get())
    }

    /// Which leg receives the odd step.
    #[inline]
    pub fn remainder(&self) -> RemainderLeg {
        self.remainder
    }

    /// Curve normalization.
    #[inline]
    pub fn scale(&self) -> CurveScale {
        self.scale
    }
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            ramp_steps: NonZeroU16::MIN.saturating_add(Self::DEFAULT_RAMP_STEPS - 1),
            remainder: RemainderLeg::default(),
            scale: CurveScale::default(),
        }
    }
}

/// Phase partition for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionProfile {
    /// Direction of motion.
    pub direction: Direction,

    /// Steps in acceleration phase.
    pub accel_steps: u32,

    /// Steps in cruise phase (constant maximum speed).
    pub cruise_steps: u32,

    /// Steps in deceleration phase.
    pub decel_steps: u32,
}

impl MotionProfile {
    /// Partition the move from `from` to `to`.
    ///
    /// Returns `Ok(None)` when already at the target.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::Overflow` if the distance does not fit in `u32`.
    pub fn plan(
        from: Steps,
        to: Steps,
        settings: &RampSettings,
    ) -> Result<Option<Self>, MotionError> {
        let distance = from.distance_to(to);
        if distance == 0 {
            return Ok(None);
        }
        let distance = u32::try_from(distance).map_err(|_| MotionError::Overflow)?;
        let ramp = settings.ramp_steps();

        let (accel_steps, cruise_steps, decel_steps) = if distance > ramp.saturating_mul(2) {
            (ramp, distance - 2 * ramp, ramp)
        } else {
            let half = distance / 2;
            match settings.remainder() {
                RemainderLeg::Accelerate => (distance - half, 0, half),
                RemainderLeg::Decelerate => (half, 0, distance - half),
            }
        };

        Ok(Some(Self {
            direction: Direction::between(from, to),
            accel_steps,
            cruise_steps,
            decel_steps,
        }))
    }

    /// Total steps of the move.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.accel_steps + self.cruise_steps + self.decel_steps
    }

    /// Phase the move starts in.
    ///
    /// A move too short for an acceleration leg starts decelerating.
    #[inline]
    pub fn initial_phase(&self) -> MotionPhase {
        if self.accel_steps == 0 {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Accelerating
        }
    }

    /// Check if the move reaches maximum speed.
    #[inline]
    pub fn is_trapezoidal(&self) -> bool {
        self.cruise_steps > 0
    }
}
