//! Motor state and the per-pulse phase state machine.
//!
//! Everything here is plain arithmetic on an owned value, so it can run in the
//! pulse interrupt and be tested without hardware. The controller wraps it with
//! the driver-stage and pulse-generator side effects.

use core::fmt;

use crate::config::units::{Speed, Steps};
use crate::motion::{Direction, MotionPhase, MotionProfile, RampSettings, SpeedCurve};

/// What the pulse generator must do after a pulse completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NextAction {
    /// Keep pulsing at this speed.
    Continue(Speed),
    /// The move is over; halt pulses and release the driver stage.
    Stop,
}

/// Logical state of one motor.
///
/// `Copy`, so a snapshot is just a copy taken between pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorState {
    direction: Direction,
    phase: MotionPhase,
    position: Steps,
    target: Steps,
    settings: RampSettings,
    curve: SpeedCurve,
    accel_steps: u32,
    cruise_steps: u32,
    decel_steps: u32,
    /// 1-based index of the pending pulse within the current phase.
    phase_step: u32,
    speed: Speed,
    /// Pulses completed in the current move.
    pulses: u32,
}

impl MotorState {
    /// Create an idle state at position 0.
    pub fn new(settings: RampSettings) -> Self {
        Self {
            direction: Direction::Forward,
            phase: MotionPhase::Idle,
            position: Steps(0),
            target: Steps(0),
            settings,
            curve: SpeedCurve::new(settings.scale(), settings.ramp_steps()),
            accel_steps: 0,
            cruise_steps: 0,
            decel_steps: 0,
            phase_step: 0,
            speed: Speed::MIN,
            pulses: 0,
        }
    }

    /// Direction of the current or most recent move.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current motion phase.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Check if no move is in progress.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == MotionPhase::Idle
    }

    /// Absolute position in steps.
    #[inline]
    pub fn position(&self) -> Steps {
        self.position
    }

    /// Target of the current or most recent move.
    #[inline]
    pub fn target(&self) -> Steps {
        self.target
    }

    /// Ramp tuning.
    #[inline]
    pub fn settings(&self) -> &RampSettings {
        &self.settings
    }

    /// Steps assigned to acceleration in the current move.
    #[inline]
    pub fn accel_steps(&self) -> u32 {
        self.accel_steps
    }

    /// Steps assigned to cruising in the current move.
    #[inline]
    pub fn cruise_steps(&self) -> u32 {
        self.cruise_steps
    }

    /// Steps assigned to deceleration in the current move.
    #[inline]
    pub fn decel_steps(&self) -> u32 {
        self.decel_steps
    }

    /// Index of the pending pulse within the current phase (0 when idle).
    #[inline]
    pub fn phase_step(&self) -> u32 {
        self.phase_step
    }

    /// Speed of the pending pulse.
    #[inline]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Pulses completed in the current move.
    #[inline]
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    /// Steps left until the target.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.position.distance_to(self.target)
    }

    pub(crate) fn set_position(&mut self, position: Steps) {
        self.position = position;
        self.target = position;
    }

    /// Commit a planned move and return the speed of its first pulse.
    pub(crate) fn begin(&mut self, profile: &MotionProfile, target: Steps) -> Speed {
        self.direction = profile.direction;
        self.target = target;
        self.accel_steps = profile.accel_steps;
        self.cruise_steps = profile.cruise_steps;
        self.decel_steps = profile.decel_steps;
        self.phase = profile.initial_phase();
        self.phase_step = 1;
        self.pulses = 0;
        self.speed = match self.phase {
            MotionPhase::Accelerating => self.curve.ease_in(1, self.accel_steps),
            _ => self.curve.ease_out(1, self.decel_steps),
        };
        self.speed
    }

    /// Account for one completed pulse and decide the next one.
    ///
    /// Phase exits are checked in order, so a phase that ends on this pulse
    /// hands over to the next phase within the same call.
    pub(crate) fn advance(&mut self) -> NextAction {
        if self.is_idle() {
            return NextAction::Stop;
        }

        self.position = Steps(self.position.0 + self.direction.sign());
        self.pulses += 1;
        self.phase_step += 1;

        if self.phase == MotionPhase::Accelerating {
            if self.phase_step > self.accel_steps {
                self.phase_step = 1;
                if self.decel_steps == 0 {
                    self.phase = MotionPhase::Idle;
                } else if self.remaining() > u64::from(self.decel_steps) {
                    self.phase = MotionPhase::Cruising;
                    self.speed = Speed::MAX;
                    trace!("cruise at pos {}", self.position.0);
                } else {
                    self.phase = MotionPhase::Decelerating;
                    trace!("decelerate at pos {}", self.position.0);
                }
            } else {
                self.speed = self.curve.ease_in(self.phase_step, self.accel_steps);
            }
        }

        if self.phase == MotionPhase::Cruising && self.phase_step > self.cruise_steps {
            self.phase_step = 1;
            self.phase = MotionPhase::Decelerating;
            trace!("decelerate at pos {}", self.position.0);
        }

        if self.phase == MotionPhase::Decelerating {
            if self.phase_step > self.decel_steps {
                self.phase = MotionPhase::Idle;
            } else {
                self.speed = self.curve.ease_out(self.phase_step, self.decel_steps);
            }
        }

        if self.is_idle() {
            debug!(
                "move complete at pos {} after {} pulses",
                self.position.0,
                self.pulses
            );
            self.halt();
            return NextAction::Stop;
        }

        NextAction::Continue(self.speed)
    }

    /// Force the idle state, keeping position and direction.
    pub(crate) fn halt(&mut self) {
        self.phase = MotionPhase::Idle;
        self.accel_steps = 0;
        self.cruise_steps = 0;
        self.decel_steps = 0;
        self.phase_step = 0;
        self.speed = Speed::MIN;
        self.pulses = 0;
    }
}

impl Default for MotorState {
    fn default() -> Self {
        Self::new(RampSettings::default())
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dir={} phase={} pos={} target={} move={} accel={} cruise={} decel={} step={} speed={} pulses={}",
            self.direction,
            self.phase,
            self.position,
            self.target,
            self.target.0 - self.position.0,
            self.accel_steps,
            self.cruise_steps,
            self.decel_steps,
            self.phase_step,
            self.speed,
            self.pulses
        )
    }
}
