//! Pulse generator capability and speed-to-period mapping.

use crate::config::units::Speed;
use crate::error::ConfigError;

/// Hardware timer producing one step pulse per period.
///
/// Implementations are expected to be thin register writers: every method is
/// called from the pulse-complete interrupt and must not block.
pub trait PulseGenerator {
    /// Start emitting pulses at the currently programmed period.
    fn start(&mut self);

    /// Stop emitting pulses.
    fn stop(&mut self);

    /// Program the period (in timer ticks) for the next pulse.
    fn set_period(&mut self, period: u32);
}

impl<T: PulseGenerator + ?Sized> PulseGenerator for &mut T {
    #[inline]
    fn start(&mut self) {
        (**self).start()
    }

    #[inline]
    fn stop(&mut self) {
        (**self).stop()
    }

    #[inline]
    fn set_period(&mut self, period: u32) {
        (**self).set_period(period)
    }
}

/// Translation from abstract speed to a timer period.
///
/// Must be monotonic: a higher speed never yields a longer period.
pub trait PeriodMap {
    /// Timer period for `speed`.
    fn period(&self, speed: Speed) -> u32;
}

impl<F> PeriodMap for F
where
    F: Fn(Speed) -> u32,
{
    #[inline]
    fn period(&self, speed: Speed) -> u32 {
        self(speed)
    }
}

/// Linear interpolation between the slowest and fastest timer periods.
///
/// With a timer clock of 84 MHz, a prescaler of 21 and 1600 pulses per
/// revolution, the default range covers 7.5 rpm (19999) to 300 rpm (499).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearPeriodMap {
    fastest: u32,
    slowest: u32,
}

impl LinearPeriodMap {
    /// Default period at maximum speed.
    pub const DEFAULT_FASTEST: u32 = 500 - 1;
    /// Default period at minimum speed.
    pub const DEFAULT_SLOWEST: u32 = 20_000 - 1;

    /// Create a mapping from `Speed::MAX -> fastest` to `Speed::MIN -> slowest`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPeriodRange` unless `fastest < slowest`.
    pub fn new(fastest: u32, slowest: u32) -> Result<Self, ConfigError> {
        if fastest >= slowest {
            return Err(ConfigError::InvalidPeriodRange { fastest, slowest });
        }
        Ok(Self { fastest, slowest })
    }

    /// Period at maximum speed.
    #[inline]
    pub fn fastest(&self) -> u32 {
        self.fastest
    }

    /// Period at minimum speed.
    #[inline]
    pub fn slowest(&self) -> u32 {
        self.slowest
    }
}

impl Default for LinearPeriodMap {
    fn default() -> Self {
        Self {
            fastest: Self::DEFAULT_FASTEST,
            slowest: Self::DEFAULT_SLOWEST,
        }
    }
}

impl PeriodMap for LinearPeriodMap {
    #[inline]
    fn period(&self, speed: Speed) -> u32 {
        let range = u64::from(self.slowest - self.fastest);
        let above_min = u64::from(speed.value() - Speed::MIN.value());
        let reduction = range * above_min / u64::from(Speed::span());
        // reduction <= range, which fits in u32
        self.slowest - reduction as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_map_endpoints() {
        let map = LinearPeriodMap::default();
        assert_eq!(map.period(Speed::MAX), 499);
        assert_eq!(map.period(Speed::MIN), 19_999);
        assert_eq!(map.period(Speed::new(5_000)), 19_999 - 9_750);
    }

    #[test]
    fn test_linear_map_is_monotonic() {
        let map = LinearPeriodMap::new(100, 1_000_000).unwrap();
        let mut last = u32::MAX;
        for raw in (0..=10_000).step_by(250) {
            let period = map.period(Speed::new(raw));
            assert!(period <= last);
            last = period;
        }
    }

    #[test]
    fn test_invalid_range() {
        assert_eq!(
            LinearPeriodMap::new(500, 500),
            Err(ConfigError::InvalidPeriodRange {
                fastest: 500,
                slowest: 500
            })
        );
    }

    #[test]
    fn test_closure_map() {
        let map = |speed: Speed| 10_000 - u32::from(speed.value());
        assert_eq!(map.period(Speed::MAX), 0);
        assert_eq!(PeriodMap::period(&map, Speed::MIN), 10_000);
    }
}
