//! Driver stage capability: direction, enable and power lines.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::config::MotorConfig;
use crate::error::MotorError;
use crate::motion::Direction;

/// Control lines of the motor driver stage.
pub trait DirectionEnable {
    /// Error raised by a failed line write.
    type Error: core::fmt::Debug;

    /// Select the rotation direction for the following pulses.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Enable or disable the driver outputs.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Switch the driver supply.
    fn set_power(&mut self, powered: bool) -> Result<(), Self::Error>;
}

impl<T: DirectionEnable + ?Sized> DirectionEnable for &mut T {
    type Error = T::Error;

    #[inline]
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        (**self).set_direction(direction)
    }

    #[inline]
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        (**self).set_enabled(enabled)
    }

    #[inline]
    fn set_power(&mut self, powered: bool) -> Result<(), Self::Error> {
        (**self).set_power(powered)
    }
}

/// Placeholder for a line the board does not wire up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// [`DirectionEnable`] over embedded-hal 1.0 output pins.
///
/// Generic over:
/// - `DIR`: DIR pin type
/// - `EN`: ENABLE pin type
/// - `PWR`: driver supply switch (use [`NoPin`] if absent)
pub struct GpioDriverStage<DIR, EN, PWR = NoPin>
where
    DIR: OutputPin,
    EN: OutputPin,
    PWR: OutputPin,
{
    dir_pin: DIR,
    enable_pin: EN,
    power_pin: PWR,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Whether the driver is enabled by pulling ENABLE low.
    enable_active_low: bool,
}

impl<DIR, EN> GpioDriverStage<DIR, EN, NoPin>
where
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Create a driver stage without a power switch.
    pub fn new(dir_pin: DIR, enable_pin: EN) -> Self {
        Self::with_power(dir_pin, enable_pin, NoPin)
    }
}

impl<DIR, EN, PWR> GpioDriverStage<DIR, EN, PWR>
where
    DIR: OutputPin,
    EN: OutputPin,
    PWR: OutputPin,
{
    /// Create a driver stage with a switched supply.
    ///
    /// Defaults to non-inverted direction and an active-low enable line.
    pub fn with_power(dir_pin: DIR, enable_pin: EN, power_pin: PWR) -> Self {
        Self {
            dir_pin,
            enable_pin,
            power_pin,
            current_direction: None,
            invert_direction: false,
            enable_active_low: true,
        }
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the ENABLE line polarity.
    pub fn enable_active_low(mut self, active_low: bool) -> Self {
        self.enable_active_low = active_low;
        self
    }

    /// Apply the pin polarity settings of a motor configuration.
    pub fn with_config(self, config: &MotorConfig) -> Self {
        self.invert_direction(config.invert_direction)
            .enable_active_low(config.enable_active_low)
    }

    /// Release the pins.
    pub fn release(self) -> (DIR, EN, PWR) {
        (self.dir_pin, self.enable_pin, self.power_pin)
    }
}

fn write<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), MotorError> {
    if high {
        pin.set_high().map_err(|_| MotorError::PinError)
    } else {
        pin.set_low().map_err(|_| MotorError::PinError)
    }
}

impl<DIR, EN, PWR> DirectionEnable for GpioDriverStage<DIR, EN, PWR>
where
    DIR: OutputPin,
    EN: OutputPin,
    PWR: OutputPin,
{
    type Error = MotorError;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Backward => self.invert_direction,
        };
        write(&mut self.dir_pin, pin_high)?;

        self.current_direction = Some(direction);
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        write(&mut self.enable_pin, enabled != self.enable_active_low)
    }

    fn set_power(&mut self, powered: bool) -> Result<(), Self::Error> {
        write(&mut self.power_pin, powered)
    }
}
