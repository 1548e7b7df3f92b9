//! Integration tests for stepper-ramp.
//!
//! These tests drive complete moves through the public API, from TOML parsing
//! to the last pulse, with test doubles that record every hardware call.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

use stepper_ramp::error::{ConfigError, MotionError};
use stepper_ramp::{
    ease_in, ease_out, parse_config, Armed, Direction, DirectionEnable, Error, GpioDriverStage,
    LinearPeriodMap, MotionController, MotionPhase, NextAction, PeriodMap, PulseGenerator,
    RampSettings, Speed, Steps,
};

// =============================================================================
// Recording test doubles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Start,
    Stop,
    Period(u32),
    Direction(Direction),
    Enabled(bool),
    Powered(bool),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct RecordingTimer(Log);

impl PulseGenerator for RecordingTimer {
    fn start(&mut self) {
        self.0.borrow_mut().push(Event::Start);
    }

    fn stop(&mut self) {
        self.0.borrow_mut().push(Event::Stop);
    }

    fn set_period(&mut self, period: u32) {
        self.0.borrow_mut().push(Event::Period(period));
    }
}

struct RecordingStage(Log);

impl DirectionEnable for RecordingStage {
    type Error = core::convert::Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::Direction(direction));
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::Enabled(enabled));
        Ok(())
    }

    fn set_power(&mut self, powered: bool) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::Powered(powered));
        Ok(())
    }
}

fn recording_motor(ramp: u16) -> (MotionController<RecordingTimer, RecordingStage>, Log) {
    let log = Log::default();
    let motor = MotionController::builder()
        .pulse_generator(RecordingTimer(log.clone()))
        .driver_stage(RecordingStage(log.clone()))
        .ramp_steps(ramp)
        .build()
        .expect("valid controller");
    (motor, log)
}

fn count(log: &Log, event: Event) -> usize {
    log.borrow().iter().filter(|e| **e == event).count()
}

// =============================================================================
// Full moves
// =============================================================================

#[test]
fn trapezoid_move_0_to_1000() {
    let (mut motor, log) = recording_motor(200);

    let armed = motor.set_target(Steps(1000)).unwrap();
    assert_eq!(armed, Armed::Started(ease_in(1, 200)));

    let state = motor.snapshot();
    assert_eq!(
        (state.accel_steps(), state.cruise_steps(), state.decel_steps()),
        (200, 600, 200)
    );
    assert_eq!(state.phase(), MotionPhase::Accelerating);

    // Arming order: power, enable, direction, first period, start.
    let map = LinearPeriodMap::default();
    assert_eq!(
        log.borrow().as_slice(),
        &[
            Event::Powered(true),
            Event::Enabled(true),
            Event::Direction(Direction::Forward),
            Event::Period(map.period(ease_in(1, 200))),
            Event::Start,
        ]
    );

    let mut speeds = Vec::new();
    for call in 1..1000 {
        match motor.advance().unwrap() {
            NextAction::Continue(speed) => speeds.push(speed),
            NextAction::Stop => panic!("stopped early at call {call}"),
        }
    }

    assert_eq!(motor.current_position(), Steps(999));
    assert_eq!(motor.phase(), MotionPhase::Decelerating);
    assert_eq!(motor.snapshot().speed(), ease_out(200, 200));

    assert_eq!(motor.advance().unwrap(), NextAction::Stop);
    assert_eq!(motor.current_position(), Steps(1000));
    assert_eq!(motor.phase(), MotionPhase::Idle);

    // Pulses 201..=800 run at full speed.
    assert!(speeds[199..799].iter().all(|s| *s == Speed::MAX));
    assert!(speeds[..199].windows(2).all(|w| w[0] <= w[1]));
    assert!(speeds[799..].windows(2).all(|w| w[0] >= w[1]));

    let log = log.borrow();
    assert_eq!(
        &log[log.len() - 4..],
        &[
            Event::Stop,
            Event::Period(map.slowest()),
            Event::Enabled(false),
            Event::Powered(false),
        ]
    );
}

#[test]
fn triangle_move_0_to_50() {
    let (mut motor, _log) = recording_motor(200);

    motor.set_target(Steps(50)).unwrap();
    let state = motor.snapshot();
    assert_eq!(
        (state.accel_steps(), state.cruise_steps(), state.decel_steps()),
        (25, 0, 25)
    );

    let mut calls = 0;
    loop {
        calls += 1;
        let action = motor.advance().unwrap();
        assert_ne!(motor.phase(), MotionPhase::Cruising);
        if action == NextAction::Stop {
            break;
        }
    }

    assert_eq!(calls, 50);
    assert_eq!(motor.current_position(), Steps(50));
}

#[test]
fn backward_move_returns_home() {
    let (mut motor, log) = recording_motor(20);

    motor.set_current_position(Steps(300)).unwrap();
    motor.set_target(Steps(-20)).unwrap();
    assert!(log
        .borrow()
        .contains(&Event::Direction(Direction::Backward)));

    let mut calls = 0;
    while motor.advance().unwrap() != NextAction::Stop {
        calls += 1;
    }
    assert_eq!(calls + 1, 320);
    assert_eq!(motor.current_position(), Steps(-20));
}

// =============================================================================
// Emergency stop and request handling
// =============================================================================

#[test]
fn emergency_stop_after_ten_pulses() {
    let (mut motor, log) = recording_motor(200);

    motor.set_target(Steps(1000)).unwrap();
    for _ in 0..10 {
        motor.advance().unwrap();
    }
    motor.emergency_stop().unwrap();

    let state = motor.snapshot();
    assert_eq!(state.phase(), MotionPhase::Idle);
    assert_eq!(state.position(), Steps(10));
    assert_eq!(
        (state.accel_steps(), state.cruise_steps(), state.decel_steps()),
        (0, 0, 0)
    );
    assert_eq!(state.phase_step(), 0);
    assert_eq!(state.speed(), Speed::MIN);
    assert_eq!(count(&log, Event::Stop), 1);
    assert_eq!(log.borrow().last(), Some(&Event::Powered(false)));

    // A late interrupt after the stop changes nothing.
    assert_eq!(motor.advance().unwrap(), NextAction::Stop);
    assert_eq!(motor.current_position(), Steps(10));

    // The motor accepts a new move from where it stopped.
    assert!(matches!(
        motor.set_target(Steps(0)).unwrap(),
        Armed::Started(_)
    ));
    assert_eq!(motor.snapshot().direction(), Direction::Backward);
}

#[test]
fn busy_rejection_keeps_running_move() {
    let (mut motor, log) = recording_motor(200);

    motor.set_target(Steps(1000)).unwrap();
    motor.advance().unwrap();
    let before = motor.snapshot();
    let events = log.borrow().len();

    assert_eq!(
        motor.set_target(Steps(-5)),
        Err(Error::Motion(MotionError::Busy))
    );
    assert_eq!(motor.snapshot(), before);
    assert_eq!(log.borrow().len(), events);
}

#[test]
fn target_equal_to_position_is_noop() {
    let (mut motor, log) = recording_motor(200);

    motor.set_current_position(Steps(42)).unwrap();
    assert_eq!(motor.set_target(Steps(42)), Ok(Armed::AtTarget));
    assert!(!motor.is_running());
    assert!(log.borrow().is_empty());
}

#[test]
fn distance_beyond_counters_overflows() {
    let (mut motor, log) = recording_motor(200);

    assert_eq!(
        motor.set_target(Steps(i64::from(u32::MAX) + 1)),
        Err(Error::Motion(MotionError::Overflow))
    );
    assert!(!motor.is_running());
    assert!(log.borrow().is_empty());
}

// =============================================================================
// Configuration to controller
// =============================================================================

const LIFT_CONFIG: &str = r#"
[motors.lift]
name = "Lift"
ramp_steps = 50
remainder_leg = "decelerate"
invert_direction = true

[motors.lift.timer]
fastest_period = 999
slowest_period = 9999

[motors.lift.limits]
min_steps = 0
max_steps = 5000
policy = "clamp"
"#;

#[test]
fn config_drives_builder() {
    let config = parse_config(LIFT_CONFIG).expect("valid config");
    let log = Log::default();

    let mut motor = MotionController::builder()
        .from_config(&config, "lift")
        .unwrap()
        .pulse_generator(RecordingTimer(log.clone()))
        .driver_stage(RecordingStage(log.clone()))
        .build()
        .unwrap();

    motor.set_target(Steps(6000)).unwrap();

    let state = motor.snapshot();
    assert_eq!(state.target(), Steps(5000));
    assert_eq!(
        (state.accel_steps(), state.cruise_steps(), state.decel_steps()),
        (50, 4900, 50)
    );

    let map = LinearPeriodMap::new(999, 9999).unwrap();
    assert!(log
        .borrow()
        .contains(&Event::Period(map.period(ease_in(1, 50)))));

    // The odd step of a short move goes to the deceleration leg.
    motor.emergency_stop().unwrap();
    motor.set_current_position(Steps(0)).unwrap();
    motor.set_target(Steps(7)).unwrap();
    let state = motor.snapshot();
    assert_eq!((state.accel_steps(), state.decel_steps()), (3, 4));
}

#[test]
fn config_rejects_zero_ramp() {
    let toml_str = r#"
[motors.lift]
name = "Lift"
ramp_steps = 0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidRampSteps(0)))
    ));
}

#[test]
fn unknown_motor_name() {
    let config = parse_config(LIFT_CONFIG).unwrap();
    let result = MotionController::<RecordingTimer, RecordingStage>::builder()
        .from_config(&config, "tilt");

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MotorNotFound(_)))
    ));
}

// =============================================================================
// GPIO driver stage
// =============================================================================

#[test]
fn gpio_stage_through_two_moves() {
    let config = parse_config(LIFT_CONFIG).unwrap();
    let lift = config.motor("lift").unwrap();

    // Direction is inverted, enable is active low.
    let dir = PinMock::new(&[
        Transaction::set(State::Low),
        Transaction::set(State::High),
    ]);
    let en = PinMock::new(&[
        Transaction::set(State::Low),
        Transaction::set(State::High),
        Transaction::set(State::Low),
        Transaction::set(State::High),
    ]);
    let stage = GpioDriverStage::new(dir, en).with_config(lift);

    let mut motor = MotionController::builder()
        .from_motor_config(lift)
        .pulse_generator(RecordingTimer(Log::default()))
        .driver_stage(stage)
        .build()
        .unwrap();

    motor.set_target(Steps(120)).unwrap();
    while motor.advance().unwrap() != NextAction::Stop {}

    motor.set_target(Steps(10)).unwrap();
    while motor.advance().unwrap() != NextAction::Stop {}
    assert_eq!(motor.current_position(), Steps(10));

    let (_, stage, _) = motor.release_hardware();
    let (mut dir, mut en, _) = stage.release();
    dir.done();
    en.done();
}

#[test]
fn custom_settings_without_builder() {
    let log = Log::default();
    let settings = RampSettings::new(10).unwrap();
    let mut motor = MotionController::new(
        RecordingTimer(log.clone()),
        RecordingStage(log.clone()),
        |speed: Speed| 1_000_000 / (u32::from(speed.value()) + 100),
        settings,
        None,
    );

    motor.set_target(Steps(3)).unwrap();
    while motor.advance().unwrap() != NextAction::Stop {}

    assert_eq!(motor.current_position(), Steps(3));
    assert_eq!(count(&log, Event::Start), 1);
    assert_eq!(count(&log, Event::Stop), 1);
    assert!(log.borrow().contains(&Event::Period(10_000)));
}
