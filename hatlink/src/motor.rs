//! Motor device and motion coordination.
//!
//! A `Motor` validates the attached device, owns the per-instance settle
//! window, gate and dispatcher, and orchestrates blocking and task-backed
//! motion commands on top of them.
//!
//! Command lifecycle: Issued → Running → Settling → Settled → (Coasted) →
//! Done. Issued computes origin/target (shortest-path normalized for
//! absolute moves) and hands the profile to the driver; every subsequent
//! sample feeds the settle window; the settled signal releases the waiter,
//! which coasts the motor unless the instance is configured to hold power.

use crate::angle::{absolute_target, shortest_delta};
use crate::dispatch::{SampleDispatcher, TapKind};
use crate::gate::BlockingGate;
use crate::rotation::RotationFilter;
use crate::settle::{SettleSignal, SettleWindow};
use crate::task::{CancelToken, CommandTask};
use hatlink_common::config::MotorConfig;
use hatlink_common::consts::{DEGREES_PER_ROTATION, SPEED_MAX, SPEED_MIN, is_motor_type};
use hatlink_common::driver::MotorDriver;
use hatlink_common::error::DeviceError;
use hatlink_common::types::{Port, ReportChannels, Sample};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

// ─── Command lifecycle ──────────────────────────────────────────────

/// Phase of one in-flight motion command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    /// Origin/target computed, profile not yet handed to the driver.
    Issued,
    /// Profile handed off; samples are flowing.
    Running,
    /// Waiting for the settle window to report completion.
    Settling,
    /// Settling reported; power still applied.
    Settled,
    /// Drive power removed.
    Coasted,
    /// Terminal.
    Done,
}

impl MotionPhase {
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// One issued move, in continuous rotations. Created per invocation,
/// consumed by the runner, discarded on completion.
#[derive(Debug, Clone, Copy)]
struct MotionCommand {
    /// Continuous target, in rotations.
    target: f64,
    /// Position at issue time, in rotations.
    origin: f64,
    /// Profile speed magnitude, percent.
    speed: i32,
}

/// Everything a command needs to run to completion, cloneable into a
/// worker thread for the task-backed variants.
#[derive(Clone)]
struct MotionRunner {
    driver: Arc<dyn MotorDriver>,
    window: Arc<Mutex<SettleWindow>>,
    gate: Arc<BlockingGate<SettleSignal>>,
    port: Port,
    release: bool,
    settle_max_wait: Option<Duration>,
}

impl MotionRunner {
    fn advance(&self, phase: &mut MotionPhase, next: MotionPhase) {
        debug!("port {}: motion phase {:?} -> {:?}", self.port, phase, next);
        *phase = next;
    }

    /// Drive one profile command from Issued to Done on the calling thread.
    fn run_profile(&self, command: MotionCommand, cancel: &CancelToken) -> Result<(), DeviceError> {
        let mut phase = MotionPhase::Issued;
        debug!(
            "port {}: issue profile target {:.4} origin {:.4} speed {}",
            self.port, command.target, command.origin, command.speed
        );

        // New command: discard completion history, prime the gate so a
        // cancel before the first sample still wakes the waiter.
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
        self.gate.post(SettleSignal {
            position: command.origin * DEGREES_PER_ROTATION,
            settled: false,
        });

        self.driver
            .run_for_degrees(command.target, command.origin, command.speed)?;
        self.advance(&mut phase, MotionPhase::Running);

        self.advance(&mut phase, MotionPhase::Settling);
        let signal = match self.settle_max_wait {
            Some(bound) => self
                .gate
                .wait_until_for(|s| s.settled || cancel.is_cancelled(), bound)
                .ok_or(DeviceError::SettleTimeout {
                    timeout_s: bound.as_secs_f64(),
                })?,
            None => self.gate.wait_until(|s| s.settled || cancel.is_cancelled()),
        };
        if cancel.is_cancelled() {
            self.driver.coast()?;
            debug!("port {}: motion cancelled", self.port);
            return Err(DeviceError::Cancelled);
        }

        self.advance(&mut phase, MotionPhase::Settled);
        if self.release {
            self.driver.coast()?;
            self.advance(&mut phase, MotionPhase::Coasted);
        }
        self.advance(&mut phase, MotionPhase::Done);
        debug!(
            "port {}: motion done at {:.1} deg",
            self.port, signal.position
        );
        Ok(())
    }

    /// Timed run: the driver call itself blocks for the duration.
    /// Cancellation is observed once the driver returns.
    fn run_timed(
        &self,
        duration: Duration,
        speed: i32,
        cancel: &CancelToken,
    ) -> Result<(), DeviceError> {
        debug!(
            "port {}: timed run {:.2}s speed {}",
            self.port,
            duration.as_secs_f64(),
            speed
        );
        self.driver.run_for_time(duration, speed)?;
        if cancel.is_cancelled() {
            self.driver.coast()?;
            return Err(DeviceError::Cancelled);
        }
        if self.release {
            self.driver.coast()?;
        }
        Ok(())
    }
}

// ─── Motor ──────────────────────────────────────────────────────────

/// One attached motor.
///
/// Owns exactly one settle window, one gate and one dispatcher, created at
/// attach time and dropped with the instance.
pub struct Motor {
    driver: Arc<dyn MotorDriver>,
    port: Port,
    config: MotorConfig,
    dispatcher: Arc<SampleDispatcher<Sample>>,
    runner: MotionRunner,
}

impl std::fmt::Debug for Motor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Motor")
            .field("port", &self.port)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Motor {
    /// Attach a motor on `port`.
    ///
    /// Validates the reported device type against the recognized motor
    /// set, configures reporting channels, applies the configured power
    /// limit and bias, and registers the sample fan-out.
    ///
    /// # Errors
    ///
    /// `DeviceError::NotAMotor` if the attached device is not a motor;
    /// `DeviceError::Config` if `config` fails validation.
    pub fn attach(
        driver: Arc<dyn MotorDriver>,
        port: Port,
        config: MotorConfig,
    ) -> Result<Self, DeviceError> {
        config.validate()?;
        let device = driver.info()?;
        if !is_motor_type(device.type_id) {
            return Err(DeviceError::NotAMotor {
                port,
                found: device.type_id,
            });
        }
        driver.select_reporting(ReportChannels::MOTOR)?;
        driver.power_limit(config.power_limit)?;
        driver.bias(config.bias)?;

        let window = Arc::new(Mutex::new(SettleWindow::new()));
        let gate = Arc::new(BlockingGate::new());
        let dispatcher = Arc::new(SampleDispatcher::new());

        // Completion tap: every raw sample feeds the window, whether or
        // not any other observer fires.
        let completion = {
            let window = window.clone();
            let gate = gate.clone();
            Box::new(move |sample: &Sample| {
                let settled = window
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observe(sample.position);
                gate.post(SettleSignal {
                    position: sample.position,
                    settled,
                });
            })
        };
        dispatcher.register(TapKind::Completion, completion);

        let fan_out = dispatcher.clone();
        driver.set_callback(Box::new(move |sample| fan_out.dispatch(&sample)))?;

        info!("motor attached on port {} (type {})", port, device.type_id);

        let runner = MotionRunner {
            driver: driver.clone(),
            window,
            gate,
            port,
            release: config.release,
            settle_max_wait: config.settle_max_wait.map(Duration::from_secs_f64),
        };
        Ok(Self {
            driver,
            port,
            config,
            dispatcher,
            runner,
        })
    }

    #[inline]
    pub const fn port(&self) -> Port {
        self.port
    }

    #[inline]
    pub const fn config(&self) -> &MotorConfig {
        &self.config
    }

    // ─── Parameter validation ───────────────────────────────────────

    fn signed_speed(&self, speed: Option<i32>) -> Result<i32, DeviceError> {
        let speed = speed.unwrap_or(self.config.default_speed);
        if !(SPEED_MIN..=SPEED_MAX).contains(&speed) {
            return Err(DeviceError::InvalidSpeed {
                speed,
                min: SPEED_MIN,
                max: SPEED_MAX,
            });
        }
        Ok(speed)
    }

    fn unsigned_speed(&self, speed: Option<i32>) -> Result<i32, DeviceError> {
        let speed = speed.unwrap_or(self.config.default_speed);
        if !(0..=SPEED_MAX).contains(&speed) {
            return Err(DeviceError::InvalidSpeed {
                speed,
                min: 0,
                max: SPEED_MAX,
            });
        }
        Ok(speed)
    }

    // ─── Command planning ───────────────────────────────────────────

    fn plan_relative(&self, degrees: f64, speed: i32) -> Result<MotionCommand, DeviceError> {
        let sample = self.driver.get()?;
        let (magnitude, direction) = if speed < 0 { (-speed, -1.0) } else { (speed, 1.0) };
        Ok(MotionCommand {
            target: (degrees * direction + sample.position) / DEGREES_PER_ROTATION,
            origin: sample.position / DEGREES_PER_ROTATION,
            speed: magnitude,
        })
    }

    fn plan_absolute(&self, degrees: f64, speed: i32) -> Result<MotionCommand, DeviceError> {
        if !(0.0..DEGREES_PER_ROTATION).contains(&degrees) {
            return Err(DeviceError::InvalidTarget { degrees });
        }
        let sample = self.driver.get()?;
        let delta = shortest_delta(degrees, sample.absolute_position);
        Ok(MotionCommand {
            target: absolute_target(sample.position, delta),
            origin: sample.position / DEGREES_PER_ROTATION,
            speed,
        })
    }

    fn spawn_profile(&self, label: &str, command: MotionCommand) -> Result<CommandTask, DeviceError> {
        let runner = self.runner.clone();
        let gate = self.runner.gate.clone();
        CommandTask::spawn(
            &format!("motor-{}-{label}", self.port),
            move || gate.poke(),
            move |token| runner.run_profile(command, &token),
        )
    }

    // ─── Motion commands ────────────────────────────────────────────

    /// Run for `degrees` at `speed` (−100..=100, negative reverses),
    /// blocking until the motion settles.
    pub fn run_for_degrees(&self, degrees: f64, speed: Option<i32>) -> Result<(), DeviceError> {
        let speed = self.signed_speed(speed)?;
        let command = self.plan_relative(degrees, speed)?;
        self.runner.run_profile(command, &CancelToken::new())
    }

    /// Task-backed variant of [`run_for_degrees`](Self::run_for_degrees):
    /// returns once the profile is planned, with a handle to join or
    /// cancel.
    pub fn run_for_degrees_background(
        &self,
        degrees: f64,
        speed: Option<i32>,
    ) -> Result<CommandTask, DeviceError> {
        let speed = self.signed_speed(speed)?;
        let command = self.plan_relative(degrees, speed)?;
        self.spawn_profile("degrees", command)
    }

    /// Run for `rotations` full turns. See [`run_for_degrees`](Self::run_for_degrees).
    pub fn run_for_rotations(&self, rotations: f64, speed: Option<i32>) -> Result<(), DeviceError> {
        self.run_for_degrees(rotations * DEGREES_PER_ROTATION, speed)
    }

    pub fn run_for_rotations_background(
        &self,
        rotations: f64,
        speed: Option<i32>,
    ) -> Result<CommandTask, DeviceError> {
        self.run_for_degrees_background(rotations * DEGREES_PER_ROTATION, speed)
    }

    /// Run to the absolute shaft angle `degrees` (0..360) along the
    /// shortest path, at `speed` (0..=100), blocking until settled.
    /// The shaft turns at most half a revolution.
    pub fn run_to_position(&self, degrees: f64, speed: Option<i32>) -> Result<(), DeviceError> {
        let speed = self.unsigned_speed(speed)?;
        let command = self.plan_absolute(degrees, speed)?;
        self.runner.run_profile(command, &CancelToken::new())
    }

    pub fn run_to_position_background(
        &self,
        degrees: f64,
        speed: Option<i32>,
    ) -> Result<CommandTask, DeviceError> {
        let speed = self.unsigned_speed(speed)?;
        let command = self.plan_absolute(degrees, speed)?;
        self.spawn_profile("position", command)
    }

    /// Run at `speed` for `duration`, then coast per configuration.
    /// Blocks for the duration.
    pub fn run_for_seconds(&self, duration: Duration, speed: Option<i32>) -> Result<(), DeviceError> {
        let speed = self.signed_speed(speed)?;
        self.runner.run_timed(duration, speed, &CancelToken::new())
    }

    pub fn run_for_seconds_background(
        &self,
        duration: Duration,
        speed: Option<i32>,
    ) -> Result<CommandTask, DeviceError> {
        let speed = self.signed_speed(speed)?;
        let runner = self.runner.clone();
        let gate = self.runner.gate.clone();
        CommandTask::spawn(
            &format!("motor-{}-timed", self.port),
            move || gate.poke(),
            move |token| runner.run_timed(duration, speed, &token),
        )
    }

    /// Start running continuously at `speed` (−100..=100).
    pub fn start(&self, speed: Option<i32>) -> Result<(), DeviceError> {
        let speed = self.signed_speed(speed)?;
        self.driver.run_at_speed(speed)?;
        Ok(())
    }

    /// Stop by removing drive power.
    pub fn stop(&self) -> Result<(), DeviceError> {
        self.driver.coast()?;
        Ok(())
    }

    // ─── Point reads ────────────────────────────────────────────────

    pub fn get(&self) -> Result<Sample, DeviceError> {
        Ok(self.driver.get()?)
    }

    /// Relative position in degrees (signed, unbounded).
    pub fn get_position(&self) -> Result<f64, DeviceError> {
        Ok(self.driver.get()?.position)
    }

    /// Absolute position in degrees, `[0, 360)`.
    pub fn get_absolute_position(&self) -> Result<f64, DeviceError> {
        Ok(self.driver.get()?.absolute_position)
    }

    pub fn get_speed(&self) -> Result<f64, DeviceError> {
        Ok(self.driver.get()?.speed)
    }

    // ─── Events ─────────────────────────────────────────────────────

    /// Register `handler` for rotation events: invoked with the full
    /// sample once accumulated motion since the last event reaches one
    /// degree. Runs in the delivery context and must not block.
    pub fn on_rotated<F>(&self, handler: F)
    where
        F: FnMut(Sample) + Send + 'static,
    {
        let mut filter = RotationFilter::new();
        let mut handler = handler;
        self.dispatcher.register(
            TapKind::Rotation,
            Box::new(move |sample: &Sample| {
                if let Some(fired) = filter.observe(sample) {
                    handler(fired);
                }
            }),
        );
    }

    /// Remove the rotation handler. Completion detection is unaffected.
    pub fn clear_rotated(&self) {
        self.dispatcher.unregister(TapKind::Rotation);
    }
}
