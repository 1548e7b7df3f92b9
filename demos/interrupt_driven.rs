//! Interrupt-driven motion example.
//!
//! A host thread plays the part of the timer interrupt: it sleeps for the
//! programmed period, then reports a completed pulse to the controller held
//! in a `static` [`SharedController`]. The main thread requests moves and
//! prints progress, the way application code would.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};

use stepper_ramp::error::ConfigError;
use stepper_ramp::{
    parse_config, GpioDriverStage, MotionController, NextAction, PulseGenerator, SharedController,
    Steps,
};

const CONFIG: &str = r#"
[motors.slider]
name = "Slider"
ramp_steps = 100

[motors.slider.timer]
fastest_period = 20
slowest_period = 400
"#;

/// Timer period and run flag shared with the simulated interrupt.
static PERIOD_US: AtomicU32 = AtomicU32::new(0);
static RUNNING: AtomicBool = AtomicBool::new(false);

/// Pulse generator backed by the simulated timer.
struct SimTimer;

impl PulseGenerator for SimTimer {
    fn start(&mut self) {
        RUNNING.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        RUNNING.store(false, Ordering::Release);
    }

    fn set_period(&mut self, period: u32) {
        PERIOD_US.store(period, Ordering::Release);
    }
}

/// Output pin that prints its transitions.
struct PrintPin(&'static str);

impl ErrorType for PrintPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for PrintPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        println!("  {} -> low", self.0);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        println!("  {} -> high", self.0);
        Ok(())
    }
}

type Stage = GpioDriverStage<PrintPin, PrintPin, PrintPin>;

static SLIDER: SharedController<SimTimer, Stage> = SharedController::new();

/// Body of the pulse-complete interrupt.
fn on_pulse_complete() -> bool {
    matches!(SLIDER.advance(), Some(Ok(NextAction::Continue(_))))
}

fn run_move(target: i64) -> stepper_ramp::Result<()> {
    println!("move to {target}");
    SLIDER.set_target(Steps(target)).unwrap_or(Ok(stepper_ramp::Armed::AtTarget))?;

    let isr = thread::spawn(|| {
        while RUNNING.load(Ordering::Acquire) {
            thread::sleep(Duration::from_micros(u64::from(PERIOD_US.load(Ordering::Acquire))));
            if !on_pulse_complete() {
                break;
            }
        }
    });

    while RUNNING.load(Ordering::Acquire) {
        if let Some(state) = SLIDER.snapshot() {
            println!("  {state}");
        }
        thread::sleep(Duration::from_millis(5));
    }
    isr.join().ok();

    if let Some(state) = SLIDER.snapshot() {
        println!("done: {state}");
    }
    Ok(())
}

fn main() -> stepper_ramp::Result<()> {
    println!("=== Interrupt-Driven Motion Example ===\n");

    let config = parse_config(CONFIG)?;
    let slider = config
        .motor("slider")
        .ok_or(stepper_ramp::Error::Config(ConfigError::MotorNotFound(
            heapless::String::new(),
        )))?;

    let stage = GpioDriverStage::with_power(PrintPin("DIR"), PrintPin("EN"), PrintPin("PWR"))
        .with_config(slider);

    let controller = MotionController::builder()
        .from_motor_config(slider)
        .pulse_generator(SimTimer)
        .driver_stage(stage)
        .build()?;
    SLIDER.init(controller);

    run_move(600)?;
    run_move(450)?;
    run_move(450)?;

    // Start a long move, then stop it part way.
    println!("move to 5000, stopping early");
    SLIDER.set_target(Steps(5000)).unwrap_or(Ok(stepper_ramp::Armed::AtTarget))?;
    for _ in 0..40 {
        on_pulse_complete();
    }
    SLIDER.emergency_stop().unwrap_or(Ok(()))?;
    if let Some(state) = SLIDER.snapshot() {
        println!("stopped: {state}");
    }

    Ok(())
}
