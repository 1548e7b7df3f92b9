//! Sharing a controller between thread context and the pulse interrupt.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::units::Steps;
use crate::error::Result;
use crate::hal::{DirectionEnable, PeriodMap, PulseGenerator};

use super::controller::{Armed, MotionController};
use super::state::{MotorState, NextAction};

/// A controller slot that can live in a `static`.
///
/// Every access runs inside a critical section, so `set_target`'s busy check
/// and commit cannot be split by a pulse interrupt.
///
/// # Example
///
/// ```rust,ignore
/// static MOTOR: SharedController<Pwm, Stage> = SharedController::new();
///
/// MOTOR.init(controller);
///
/// #[interrupt]
/// fn TIM1_UP() {
///     MOTOR.advance();
/// }
/// ```
pub struct SharedController<PULSE, STAGE, MAP = crate::hal::LinearPeriodMap>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    inner: Mutex<RefCell<Option<MotionController<PULSE, STAGE, MAP>>>>,
}

impl<PULSE, STAGE, MAP> SharedController<PULSE, STAGE, MAP>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install a controller, returning the previous one.
    pub fn init(
        &self,
        controller: MotionController<PULSE, STAGE, MAP>,
    ) -> Option<MotionController<PULSE, STAGE, MAP>> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(controller)))
    }

    /// Remove the controller.
    pub fn take(&self) -> Option<MotionController<PULSE, STAGE, MAP>> {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }

    /// Run `f` on the controller inside a critical section.
    ///
    /// Returns `None` if no controller is installed.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut MotionController<PULSE, STAGE, MAP>) -> R,
    ) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// [`MotionController::set_target`] under the lock.
    pub fn set_target(&self, target: Steps) -> Option<Result<Armed>> {
        self.with(|c| c.set_target(target))
    }

    /// [`MotionController::advance`] under the lock; call from the pulse interrupt.
    pub fn advance(&self) -> Option<Result<NextAction>> {
        self.with(|c| c.advance())
    }

    /// [`MotionController::emergency_stop`] under the lock.
    pub fn emergency_stop(&self) -> Option<Result<()>> {
        self.with(|c| c.emergency_stop())
    }

    /// [`MotionController::snapshot`] under the lock.
    pub fn snapshot(&self) -> Option<MotorState> {
        self.with(|c| c.snapshot())
    }
}

impl<PULSE, STAGE, MAP> Default for SharedController<PULSE, STAGE, MAP>
where
    PULSE: PulseGenerator,
    STAGE: DirectionEnable,
    MAP: PeriodMap,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::error::{Error, MotionError};
    use crate::hal::LinearPeriodMap;
    use crate::motion::{Direction, RampSettings};

    struct CountingTimer(u32);

    impl PulseGenerator for CountingTimer {
        fn start(&mut self) {}
        fn stop(&mut self) {
            self.0 += 1;
        }
        fn set_period(&mut self, _: u32) {}
    }

    struct NullStage;

    impl DirectionEnable for NullStage {
        type Error = ();

        fn set_direction(&mut self, _: Direction) -> core::result::Result<(), ()> {
            Ok(())
        }
        fn set_enabled(&mut self, _: bool) -> core::result::Result<(), ()> {
            Ok(())
        }
        fn set_power(&mut self, _: bool) -> core::result::Result<(), ()> {
            Ok(())
        }
    }

    static MOTOR: SharedController<CountingTimer, NullStage> = SharedController::new();

    #[test]
    fn test_static_slot_round_trip() {
        let shared: SharedController<CountingTimer, NullStage> = SharedController::new();
        assert!(shared.advance().is_none());

        shared.init(MotionController::new(
            CountingTimer(0),
            NullStage,
            LinearPeriodMap::default(),
            RampSettings::new(5).unwrap(),
            None,
        ));

        assert!(matches!(shared.set_target(Steps(20)), Some(Ok(Armed::Started(_)))));
        assert!(matches!(
            shared.set_target(Steps(30)),
            Some(Err(Error::Motion(MotionError::Busy)))
        ));

        while let Some(Ok(NextAction::Continue(_))) = shared.advance() {}
        assert_eq!(shared.snapshot().map(|s| s.position()), Some(Steps(20)));

        let controller = shared.take().unwrap();
        assert_eq!(controller.pulse_generator().0, 1);
    }

    #[test]
    fn test_interrupt_thread_drives_move() {
        MOTOR.init(MotionController::new(
            CountingTimer(0),
            NullStage,
            LinearPeriodMap::default(),
            RampSettings::new(50).unwrap(),
            None,
        ));
        MOTOR.set_target(Steps(500)).unwrap().unwrap();

        let isr = std::thread::spawn(|| {
            let mut pulses = 0;
            while let Some(Ok(NextAction::Continue(_))) = MOTOR.advance() {
                pulses += 1;
            }
            pulses + 1
        });

        assert_eq!(isr.join().unwrap(), 500);
        assert_eq!(MOTOR.snapshot().map(|s| s.position()), Some(Steps(500)));
        assert_eq!(MOTOR.emergency_stop().map(|r| r.is_ok()), Some(true));
    }
}
