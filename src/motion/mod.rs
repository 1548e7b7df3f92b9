//! Motion module for stepper-ramp.
//!
//! Provides move partitioning and the cosine speed curve.

mod curve;
mod profile;

pub use curve::{ease_in, ease_out, CurveScale, SpeedCurve};
pub use profile::{Direction, MotionPhase, MotionProfile, RampSettings, RemainderLeg};
