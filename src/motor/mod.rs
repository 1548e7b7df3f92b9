//! Motor module for stepper-ramp.
//!
//! Provides the interrupt-driven motion controller and its per-pulse state.

mod builder;
mod controller;
#[cfg(feature = "critical-section")]
mod shared;
mod state;

pub use builder::MotionControllerBuilder;
pub use controller::{Armed, MotionController};
#[cfg(feature = "critical-section")]
pub use shared::SharedController;
pub use state::{MotorState, NextAction};
