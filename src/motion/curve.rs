//! Cosine speed curve.
//!
//! A half-cosine ramp starts and ends with zero slope, which keeps the motor
//! from jerking at the ends of a ramp. Both functions are pure and cost one
//! `cosf` each, so they are cheap enough for the pulse interrupt.

use core::f32::consts::PI;

use libm::{cosf, roundf};
use serde::Deserialize;

use crate::config::units::Speed;

/// How a ramp position is normalized onto the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum CurveScale {
    /// Stretch the curve over the current phase, so every ramp ends at full speed.
    #[default]
    Phase,
    /// Keep the curve at the configured ramp length, so short moves peak below
    /// full speed and the acceleration rate is the same for every move.
    Ramp,
}

/// Speed at `step` of a rising ramp spanning `span` steps.
///
/// `ease_in(span, span)` is [`Speed::MAX`]; values approach [`Speed::MIN`] as
/// `step` approaches zero. `span` must not be zero.
#[inline]
pub fn ease_in(step: u32, span: u32) -> Speed {
    debug_assert!(span > 0, "ramp span must be at least one step");

    let ratio = step as f32 / span as f32;
    let level = (1.0 - cosf(PI * ratio)) / 2.0;
    let value = level * Speed::span() as f32 + Speed::MIN.value() as f32;

    // Float error can leave the range by a hair at either end.
    let value = roundf(value).clamp(Speed::MIN.value() as f32, Speed::MAX.value() as f32);
    Speed::new(value as u16)
}

/// Speed at `step` of a falling ramp spanning `span` steps.
///
/// The mirror of [`ease_in`]: `ease_out(1, n) == ease_in(n, n)` and
/// `ease_out(n, n) == ease_in(1, n)`.
#[inline]
pub fn ease_out(step: u32, span: u32) -> Speed {
    ease_in((span + 1).saturating_sub(step), span)
}

/// Speed curve bound to a ramp length and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedCurve {
    scale: CurveScale,
    ramp_steps: u32,
}

impl SpeedCurve {
    /// Create a curve for ramps of `ramp_steps` steps.
    pub fn new(scale: CurveScale, ramp_steps: u32) -> Self {
        Self { scale, ramp_steps }
    }

    #[inline]
    fn span(&self, phase_steps: u32) -> u32 {
        match self.scale {
            CurveScale::Phase => phase_steps,
            CurveScale::Ramp => self.ramp_steps.max(phase_steps),
        }
    }

    /// Speed at `step` of an acceleration phase lasting `phase_steps`.
    #[inline]
    pub fn ease_in(&self, step: u32, phase_steps: u32) -> Speed {
        ease_in(step, self.span(phase_steps))
    }

    /// Speed at `step` of a deceleration phase lasting `phase_steps`.
    ///
    /// With [`CurveScale::Ramp`] the deceleration mirrors the acceleration of a
    /// phase of the same length, so a short move ends at the same low speed it
    /// started from.
    #[inline]
    pub fn ease_out(&self, step: u32, phase_steps: u32) -> Speed {
        let step = (phase_steps + 1).saturating_sub(step);
        ease_in(step, self.span(phase_steps))
    }
}
