//! Integration tests for motor motion coordination.
//!
//! Exercise the full path driver → dispatcher → settle window → gate →
//! coordinator over the simulation driver: blocking and task-backed
//! commands, settling, coast/hold-power, cancellation, timeout, and the
//! dual-motor barrier join.

use hatlink::Motor;
use hatlink::MotorPair;
use hatlink::drivers::simulation::{SimCommand, SimulatedMotor};
use hatlink_common::config::{ConfigLoader, HatConfig, MotorConfig};
use hatlink_common::error::DeviceError;
use hatlink_common::types::{Port, ReportChannels, Sample};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("hatlink=debug")
        .with_test_writer()
        .try_init();
}

fn attach(sim: &SimulatedMotor, port: Port, config: MotorConfig) -> Motor {
    Motor::attach(Arc::new(sim.clone()), port, config).expect("attach failed")
}

fn sample_at(position: f64) -> Sample {
    Sample {
        speed: 20.0,
        position,
        absolute_position: position.rem_euclid(360.0),
    }
}

/// Poll until the sim has recorded a profile command, so the worker has
/// passed its window reset and manual feeds are not discarded.
fn wait_for_profile(sim: &SimulatedMotor) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !sim
        .commands()
        .iter()
        .any(|c| matches!(c, SimCommand::RunForDegrees { .. }))
    {
        assert!(Instant::now() < deadline, "profile command never issued");
        std::thread::sleep(Duration::from_millis(1));
    }
}

// ── Attach ──────────────────────────────────────────────────────────

#[test]
fn attach_configures_reporting_power_and_bias() {
    let sim = SimulatedMotor::new();
    let _motor = attach(&sim, Port::A, MotorConfig::default());
    assert_eq!(
        sim.commands(),
        vec![
            SimCommand::SelectReporting(ReportChannels::MOTOR),
            SimCommand::PowerLimit(0.7),
            SimCommand::Bias(0.3),
        ]
    );
}

// ── Blocking commands ───────────────────────────────────────────────

#[test]
fn blocking_run_settles_and_coasts_once() {
    init_tracing();
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    motor.run_for_degrees(90.0, Some(50)).unwrap();

    assert_eq!(sim.coast_count(), 1);
    assert!(sim.commands().contains(&SimCommand::RunForDegrees {
        target: 0.25,
        origin: 0.0,
        speed: 50,
    }));
}

#[test]
fn negative_speed_reverses_direction() {
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    motor.run_for_degrees(90.0, Some(-50)).unwrap();

    // Negative speed: target behind the origin, magnitude forwarded.
    assert!(sim.commands().contains(&SimCommand::RunForDegrees {
        target: -0.25,
        origin: 0.0,
        speed: 50,
    }));
}

#[test]
fn release_disabled_holds_power() {
    let sim = SimulatedMotor::new();
    let config = MotorConfig {
        release: false,
        ..Default::default()
    };
    let motor = attach(&sim, Port::A, config);

    motor.run_for_degrees(90.0, Some(50)).unwrap();

    assert_eq!(sim.coast_count(), 0);
}

#[test]
fn absolute_move_takes_shortest_path() {
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());
    sim.set_state(sample_at(0.0));

    motor.run_to_position(270.0, Some(50)).unwrap();

    // 270° is a quarter turn backward, never three quarters forward.
    assert!(sim.commands().contains(&SimCommand::RunForDegrees {
        target: -0.25,
        origin: 0.0,
        speed: 50,
    }));
}

#[test]
fn run_for_rotations_scales_to_degrees() {
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    motor.run_for_rotations(2.0, Some(50)).unwrap();

    assert!(sim.commands().contains(&SimCommand::RunForDegrees {
        target: 2.0,
        origin: 0.0,
        speed: 50,
    }));
}

#[test]
fn config_file_drives_motor_behavior() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("hat.toml");
    std::fs::write(&path, "[motor]\ndefault_speed = 40\nrelease = false\n").unwrap();
    let config = HatConfig::load(&path).unwrap();
    config.validate().unwrap();

    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, config.motor);
    motor.run_for_degrees(90.0, None).unwrap();

    // Speed defaulted from the file; power held per release = false.
    assert!(sim.commands().contains(&SimCommand::RunForDegrees {
        target: 0.25,
        origin: 0.0,
        speed: 40,
    }));
    assert_eq!(sim.coast_count(), 0);
}

#[test]
fn default_speed_comes_from_config() {
    let sim = SimulatedMotor::new();
    let config = MotorConfig {
        default_speed: 35,
        ..Default::default()
    };
    let motor = attach(&sim, Port::A, config);

    motor.start(None).unwrap();
    motor.stop().unwrap();

    assert!(sim.commands().contains(&SimCommand::RunAtSpeed(35)));
    assert_eq!(sim.coast_count(), 1);
}

// ── Settling over an exact sample sequence ──────────────────────────

#[test]
fn equal_samples_settle_on_the_fifth() {
    init_tracing();
    let sim = SimulatedMotor::manual();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    let task = motor.run_for_degrees_background(0.0, Some(20)).unwrap();
    wait_for_profile(&sim);

    for _ in 0..4 {
        sim.feed(sample_at(10.0));
    }
    std::thread::sleep(Duration::from_millis(20));
    assert!(!task.is_finished(), "settled before the window was full");

    sim.feed(sample_at(10.0));
    task.join().unwrap();
    assert_eq!(sim.coast_count(), 1);
}

#[test]
fn moving_samples_do_not_settle() {
    let sim = SimulatedMotor::manual();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    let task = motor.run_for_degrees_background(360.0, Some(20)).unwrap();
    wait_for_profile(&sim);

    for position in [0.0, 40.0, 80.0, 120.0, 160.0, 200.0] {
        sim.feed(sample_at(position));
    }
    std::thread::sleep(Duration::from_millis(20));
    assert!(!task.is_finished());

    // Deceleration into a stable tail settles it.
    for _ in 0..5 {
        sim.feed(sample_at(360.0));
    }
    task.join().unwrap();
}

// ── Failure and cancellation paths ──────────────────────────────────

#[test]
fn invalid_speed_is_rejected_before_the_driver_sees_anything() {
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());
    let issued_at_attach = sim.commands().len();

    let err = motor.run_for_degrees(90.0, Some(-101)).unwrap_err();
    assert!(matches!(err, DeviceError::InvalidSpeed { speed: -101, .. }));
    assert_eq!(sim.commands().len(), issued_at_attach);
}

#[test]
fn settle_timeout_surfaces_when_configured() {
    let sim = SimulatedMotor::manual();
    let config = MotorConfig {
        settle_max_wait: Some(0.05),
        ..Default::default()
    };
    let motor = attach(&sim, Port::A, config);

    // Manual sim never emits: without the bound this would block forever.
    let err = motor.run_for_degrees(90.0, Some(50)).unwrap_err();
    assert!(matches!(err, DeviceError::SettleTimeout { .. }));
}

#[test]
fn cancelled_command_coasts_and_reports_cancelled() {
    let sim = SimulatedMotor::manual();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    let task = motor.run_for_degrees_background(90.0, Some(50)).unwrap();
    wait_for_profile(&sim);

    task.cancel();
    assert!(matches!(task.join(), Err(DeviceError::Cancelled)));
    assert_eq!(sim.coast_count(), 1);
}

// ── Rotation events ─────────────────────────────────────────────────

#[test]
fn rotation_events_fire_on_accumulated_motion() {
    let sim = SimulatedMotor::manual();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = fired.clone();
    motor.on_rotated(move |sample| sink.lock().unwrap().push(sample.position));

    for position in [0.0, 0.5, 1.2, 1.7, 3.0] {
        sim.feed(sample_at(position));
    }

    assert_eq!(*fired.lock().unwrap(), vec![1.2, 3.0]);
}

#[test]
fn rotation_handler_does_not_break_completion() {
    let sim = SimulatedMotor::new();
    let motor = attach(&sim, Port::A, MotorConfig::default());

    let hits = Arc::new(Mutex::new(0usize));
    let sink = hits.clone();
    motor.on_rotated(move |_| *sink.lock().unwrap() += 1);

    // Both observers share the one delivery slot: the motion still
    // settles, and the handler still sees the movement.
    motor.run_for_degrees(90.0, Some(50)).unwrap();
    assert_eq!(sim.coast_count(), 1);
    assert!(*hits.lock().unwrap() > 0);
}

// ── Dual-motor barrier ──────────────────────────────────────────────

#[test]
fn pair_timed_run_returns_only_after_both_members() {
    init_tracing();
    let left_sim = SimulatedMotor::new();
    let right_sim = SimulatedMotor::new();
    let pair = MotorPair::new(
        attach(&left_sim, Port::A, MotorConfig::default()),
        attach(&right_sim, Port::B, MotorConfig::default()),
    );

    let duration = Duration::from_millis(60);
    let started = Instant::now();
    pair.run_for_seconds(duration, Some(30), Some(40)).unwrap();
    assert!(started.elapsed() >= duration);

    assert!(left_sim.commands().contains(&SimCommand::RunForTime {
        duration,
        speed: 30
    }));
    assert!(right_sim.commands().contains(&SimCommand::RunForTime {
        duration,
        speed: 40
    }));
    // Each member coasted exactly once after its own task finished.
    assert_eq!(left_sim.coast_count(), 1);
    assert_eq!(right_sim.coast_count(), 1);
}

#[test]
fn pair_positional_commands_drive_both_members() {
    let left_sim = SimulatedMotor::new();
    let right_sim = SimulatedMotor::new();
    let pair = MotorPair::new(
        attach(&left_sim, Port::A, MotorConfig::default()),
        attach(&right_sim, Port::B, MotorConfig::default()),
    );

    pair.run_for_degrees(90.0, Some(50), Some(60)).unwrap();

    assert!(left_sim.commands().contains(&SimCommand::RunForDegrees {
        target: 0.25,
        origin: 0.0,
        speed: 50,
    }));
    assert!(right_sim.commands().contains(&SimCommand::RunForDegrees {
        target: 0.25,
        origin: 0.0,
        speed: 60,
    }));
}
