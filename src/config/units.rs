//! Unit types for motor positions and speeds.
//!
//! Keeps step counts and abstract speeds apart at compile time so a position
//! can never be programmed into a timer by accident.

use core::fmt;
use core::ops::{Add, Sub};

use serde::Deserialize;

/// Motor position in steps (absolute from origin).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }

    /// Number of steps between two positions, regardless of direction.
    #[inline]
    pub fn distance_to(self, other: Steps) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl From<i64> for Steps {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract, unitless motor speed in `[Speed::MIN, Speed::MAX]`.
///
/// `Speed::MIN` means stopped. The mapping to a timer period is left to a
/// [`PeriodMap`](crate::hal::PeriodMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Speed(u16);

impl Speed {
    /// Stopped.
    pub const MIN: Self = Self(0);
    /// Full speed.
    pub const MAX: Self = Self(10_000);

    /// Create a speed, saturating into the valid range.
    #[inline]
    pub const fn new(value: u16) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Width of the speed range.
    #[inline]
    pub const fn span() -> u16 {
        Self::MAX.0 - Self::MIN.0
    }

    /// Check if this is the stopped speed.
    #[inline]
    pub const fn is_stopped(self) -> bool {
        self.0 == Self::MIN.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
