//! # stepper-ramp
//!
//! Interrupt-driven trapezoidal motion control for a single stepper axis.
//!
//! ## Features
//!
//! - **Cosine easing**: Smooth acceleration and deceleration ramps
//! - **Per-pulse planning**: Constant-time speed update from the pulse interrupt
//! - **Triangle fallback**: Short moves split the distance between ramps
//! - **embedded-hal 1.0**: Direction, enable and power lines are `OutputPin`s
//! - **no_std compatible**: Core library works without standard library
//! - **Configuration-driven**: Ramp length, period range and soft limits from TOML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_ramp::{GpioDriverStage, MotionController, NextAction, Steps};
//!
//! let mut motor = MotionController::builder()
//!     .pulse_generator(pwm)
//!     .driver_stage(GpioDriverStage::new(dir_pin, en_pin))
//!     .ramp_steps(200)
//!     .build()?;
//!
//! motor.set_target(Steps(1000))?;
//!
//! // In the pulse-complete interrupt:
//! if let NextAction::Stop = motor.advance()? {
//!     // move finished, driver released
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `critical-section` (default): Enables [`SharedController`] for ISR sharing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod motion;
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, StepLimits, SystemConfig};
pub use error::{Error, Result};
pub use hal::{DirectionEnable, GpioDriverStage, LinearPeriodMap, PeriodMap, PulseGenerator};
pub use motion::{
    ease_in, ease_out, CurveScale, Direction, MotionPhase, MotionProfile, RampSettings,
    RemainderLeg, SpeedCurve,
};
pub use motor::{Armed, MotionController, MotionControllerBuilder, MotorState, NextAction};

#[cfg(feature = "critical-section")]
pub use motor::SharedController;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Speed, Steps};
