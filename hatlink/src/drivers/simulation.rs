//! Simulation driver implementation.
//!
//! `SimulatedMotor` and `SimulatedDistanceSensor` implement the driver
//! boundary traits for development and testing without physical hardware.
//! Profile commands emit an approach ramp followed by stable samples on a
//! worker thread; every issued command is recorded for assertions, and
//! readings can be injected directly with `feed`.

use hatlink_common::consts::SETTLE_WINDOW;
use hatlink_common::driver::{DistanceDriver, MotorDriver, PortDriver};
use hatlink_common::error::DriverError;
use hatlink_common::types::{DistanceCallback, PortInfo, ReportChannels, Sample, SampleCallback};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Default simulated motor type id (a recognized motor).
const SIM_MOTOR_TYPE_ID: u16 = 48;

/// Default simulated distance sensor type id.
const SIM_DISTANCE_TYPE_ID: u16 = 62;

/// Interval between emitted samples.
const SIM_TICK: Duration = Duration::from_millis(1);

/// Number of in-motion samples emitted before a profile stabilizes.
const SIM_RAMP_STEPS: usize = 8;

/// One recorded driver command.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    SelectReporting(ReportChannels),
    Reverse,
    PowerLimit(f64),
    Bias(f64),
    RunForDegrees { target: f64, origin: f64, speed: i32 },
    RunForTime { duration: Duration, speed: i32 },
    RunAtSpeed(i32),
    Coast,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Simulated motor ────────────────────────────────────────────────

struct MotorSimState {
    type_id: u16,
    /// Manual mode: profile commands are recorded but emit nothing; the
    /// test injects samples itself with `feed`.
    manual: bool,
    callback: Mutex<Option<SampleCallback>>,
    commands: Mutex<Vec<SimCommand>>,
    sample: Mutex<Sample>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

/// Software-emulated motor.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the device layer owns another.
#[derive(Clone)]
pub struct SimulatedMotor {
    state: Arc<MotorSimState>,
}

impl SimulatedMotor {
    pub fn new() -> Self {
        Self::with_type(SIM_MOTOR_TYPE_ID)
    }

    /// Simulate a device reporting `type_id` (for attach-mismatch tests).
    pub fn with_type(type_id: u16) -> Self {
        Self::build(type_id, false)
    }

    /// Manual-mode motor: profile commands are recorded but no samples are
    /// emitted, so the test controls the stream sample by sample.
    pub fn manual() -> Self {
        Self::build(SIM_MOTOR_TYPE_ID, true)
    }

    fn build(type_id: u16, manual: bool) -> Self {
        Self {
            state: Arc::new(MotorSimState {
                type_id,
                manual,
                callback: Mutex::new(None),
                commands: Mutex::new(Vec::new()),
                sample: Mutex::new(Sample::default()),
                workers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Overwrite the point-read state without delivering a sample.
    pub fn set_state(&self, sample: Sample) {
        *lock(&self.state.sample) = sample;
    }

    /// Commands issued so far, in order.
    pub fn commands(&self) -> Vec<SimCommand> {
        lock(&self.state.commands).clone()
    }

    /// Number of coast commands issued so far.
    pub fn coast_count(&self) -> usize {
        lock(&self.state.commands)
            .iter()
            .filter(|c| matches!(c, SimCommand::Coast))
            .count()
    }

    /// Inject one sample directly into the delivery context.
    pub fn feed(&self, sample: Sample) {
        Self::emit(&self.state, sample);
    }

    /// Join all profile workers spawned so far.
    pub fn wait_idle(&self) {
        let workers: Vec<_> = lock(&self.state.workers).drain(..).collect();
        for worker in workers {
            let _ = worker.join();
        }
    }

    fn record(&self, command: SimCommand) {
        lock(&self.state.commands).push(command);
    }

    fn emit(state: &Arc<MotorSimState>, sample: Sample) {
        *lock(&state.sample) = sample;
        if let Some(callback) = lock(&state.callback).as_mut() {
            callback(sample);
        }
    }
}

impl Default for SimulatedMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDriver for SimulatedMotor {
    fn info(&self) -> Result<PortInfo, DriverError> {
        Ok(PortInfo {
            type_id: self.state.type_id,
        })
    }

    fn select_reporting(&self, channels: ReportChannels) -> Result<(), DriverError> {
        self.record(SimCommand::SelectReporting(channels));
        Ok(())
    }

    fn reverse(&self) -> Result<(), DriverError> {
        self.record(SimCommand::Reverse);
        Ok(())
    }
}

impl MotorDriver for SimulatedMotor {
    fn set_callback(&self, callback: SampleCallback) -> Result<(), DriverError> {
        *lock(&self.state.callback) = Some(callback);
        Ok(())
    }

    fn get(&self) -> Result<Sample, DriverError> {
        Ok(*lock(&self.state.sample))
    }

    fn run_for_degrees(&self, target: f64, origin: f64, speed: i32) -> Result<(), DriverError> {
        self.record(SimCommand::RunForDegrees {
            target,
            origin,
            speed,
        });
        debug!("sim motor: profile {origin:.4} -> {target:.4} at {speed}");
        if self.state.manual {
            return Ok(());
        }

        let state = self.state.clone();
        let worker = thread::spawn(move || {
            let from = origin * 360.0;
            let to = target * 360.0;
            for step in 1..=SIM_RAMP_STEPS {
                let position = from + (to - from) * (step as f64 / SIM_RAMP_STEPS as f64);
                SimulatedMotor::emit(
                    &state,
                    Sample {
                        speed: speed as f64,
                        position,
                        absolute_position: position.rem_euclid(360.0),
                    },
                );
                thread::sleep(SIM_TICK);
            }
            for _ in 0..SETTLE_WINDOW {
                SimulatedMotor::emit(
                    &state,
                    Sample {
                        speed: 0.0,
                        position: to,
                        absolute_position: to.rem_euclid(360.0),
                    },
                );
                thread::sleep(SIM_TICK);
            }
        });
        lock(&self.state.workers).push(worker);
        Ok(())
    }

    fn run_for_time(&self, duration: Duration, speed: i32) -> Result<(), DriverError> {
        self.record(SimCommand::RunForTime { duration, speed });
        debug!("sim motor: timed run {:.3}s at {speed}", duration.as_secs_f64());

        // Blocks for the duration, like the real transport call.
        let ticks = (duration.as_micros() / SIM_TICK.as_micros()).max(1);
        for _ in 0..ticks {
            let sample = {
                let mut current = lock(&self.state.sample);
                current.position += speed as f64 * 0.1;
                current.absolute_position = current.position.rem_euclid(360.0);
                current.speed = speed as f64;
                *current
            };
            if let Some(callback) = lock(&self.state.callback).as_mut() {
                callback(sample);
            }
            thread::sleep(SIM_TICK);
        }
        Ok(())
    }

    fn run_at_speed(&self, speed: i32) -> Result<(), DriverError> {
        self.record(SimCommand::RunAtSpeed(speed));
        lock(&self.state.sample).speed = speed as f64;
        Ok(())
    }

    fn coast(&self) -> Result<(), DriverError> {
        self.record(SimCommand::Coast);
        lock(&self.state.sample).speed = 0.0;
        Ok(())
    }

    fn power_limit(&self, limit: f64) -> Result<(), DriverError> {
        self.record(SimCommand::PowerLimit(limit));
        Ok(())
    }

    fn bias(&self, bias: f64) -> Result<(), DriverError> {
        self.record(SimCommand::Bias(bias));
        Ok(())
    }
}

// ─── Simulated distance sensor ──────────────────────────────────────

struct SensorSimState {
    type_id: u16,
    callback: Mutex<Option<DistanceCallback>>,
    commands: Mutex<Vec<SimCommand>>,
    reading: Mutex<i32>,
}

/// Software-emulated distance sensor.
#[derive(Clone)]
pub struct SimulatedDistanceSensor {
    state: Arc<SensorSimState>,
}

impl SimulatedDistanceSensor {
    pub fn new() -> Self {
        Self::with_type(SIM_DISTANCE_TYPE_ID)
    }

    /// Simulate a device reporting `type_id` (for attach-mismatch tests).
    pub fn with_type(type_id: u16) -> Self {
        Self {
            state: Arc::new(SensorSimState {
                type_id,
                callback: Mutex::new(None),
                commands: Mutex::new(Vec::new()),
                reading: Mutex::new(hatlink_common::consts::NO_READING),
            }),
        }
    }

    /// Commands issued so far, in order.
    pub fn commands(&self) -> Vec<SimCommand> {
        lock(&self.state.commands).clone()
    }

    /// Set the value returned by point reads without delivering a sample.
    pub fn set_reading(&self, distance: i32) {
        *lock(&self.state.reading) = distance;
    }

    /// Inject one reading into the delivery context.
    pub fn feed(&self, distance: i32) {
        *lock(&self.state.reading) = distance;
        if let Some(callback) = lock(&self.state.callback).as_mut() {
            callback(distance);
        }
    }
}

impl Default for SimulatedDistanceSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDriver for SimulatedDistanceSensor {
    fn info(&self) -> Result<PortInfo, DriverError> {
        Ok(PortInfo {
            type_id: self.state.type_id,
        })
    }

    fn select_reporting(&self, channels: ReportChannels) -> Result<(), DriverError> {
        lock(&self.state.commands).push(SimCommand::SelectReporting(channels));
        Ok(())
    }

    fn reverse(&self) -> Result<(), DriverError> {
        lock(&self.state.commands).push(SimCommand::Reverse);
        Ok(())
    }
}

impl DistanceDriver for SimulatedDistanceSensor {
    fn set_callback(&self, callback: DistanceCallback) -> Result<(), DriverError> {
        *lock(&self.state.callback) = Some(callback);
        Ok(())
    }

    fn read_distance(&self) -> Result<i32, DriverError> {
        Ok(*lock(&self.state.reading))
    }
}
