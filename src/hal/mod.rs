//! Hardware capabilities consumed by the motion controller.
//!
//! The controller never touches peripherals directly. Boards provide a
//! [`PulseGenerator`] (usually a PWM timer with an update interrupt), a
//! [`DirectionEnable`] (usually [`GpioDriverStage`] over embedded-hal pins) and
//! a [`PeriodMap`] translating abstract speed into timer ticks.

mod pulse;
mod stage;

pub use pulse::{LinearPeriodMap, PeriodMap, PulseGenerator};
pub use stage::{DirectionEnable, GpioDriverStage, NoPin};
