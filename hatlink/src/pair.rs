//! Paired motors driven as one unit.
//!
//! A `MotorPair` owns two motors. Timed runs start one command task per
//! member and perform a two-way join, returning only once both commands
//! have completed. This is the only fan-out/barrier construct in this layer.
//! Positional commands drive the members back to back.

use crate::motor::Motor;
use hatlink_common::error::DeviceError;
use std::time::Duration;
use tracing::debug;

/// Speed used by pair commands when the call site omits one.
pub const DEFAULT_PAIR_SPEED: i32 = 50;

/// Two motors commanded together.
pub struct MotorPair {
    left: Motor,
    right: Motor,
    default_speed: i32,
}

impl MotorPair {
    pub fn new(left: Motor, right: Motor) -> Self {
        Self {
            left,
            right,
            default_speed: DEFAULT_PAIR_SPEED,
        }
    }

    /// Override the pair-level default speed.
    pub fn with_default_speed(mut self, default_speed: i32) -> Self {
        self.default_speed = default_speed;
        self
    }

    #[inline]
    pub const fn left(&self) -> &Motor {
        &self.left
    }

    #[inline]
    pub const fn right(&self) -> &Motor {
        &self.right
    }

    fn speeds(&self, speed_left: Option<i32>, speed_right: Option<i32>) -> (i32, i32) {
        (
            speed_left.unwrap_or(self.default_speed),
            speed_right.unwrap_or(self.default_speed),
        )
    }

    /// Run both members for `duration`, joining both command tasks.
    ///
    /// Returns only after both members report completion; a stall in
    /// either member stalls the join. The first member error wins, but
    /// both tasks are always joined.
    pub fn run_for_seconds(
        &self,
        duration: Duration,
        speed_left: Option<i32>,
        speed_right: Option<i32>,
    ) -> Result<(), DeviceError> {
        let (speed_left, speed_right) = self.speeds(speed_left, speed_right);
        let left = self
            .left
            .run_for_seconds_background(duration, Some(speed_left))?;
        let right = match self
            .right
            .run_for_seconds_background(duration, Some(speed_right))
        {
            Ok(task) => task,
            Err(e) => {
                // The left command is already running; wait it out so the
                // pair is quiescent before reporting the failure.
                let _ = left.join();
                return Err(e);
            }
        };
        debug!("pair: timed run {:.2}s issued on both members", duration.as_secs_f64());
        let left_result = left.join();
        let right_result = right.join();
        left_result.and(right_result)
    }

    /// Run both members for `degrees`, one after the other, each blocking
    /// until settled.
    pub fn run_for_degrees(
        &self,
        degrees: f64,
        speed_left: Option<i32>,
        speed_right: Option<i32>,
    ) -> Result<(), DeviceError> {
        let (speed_left, speed_right) = self.speeds(speed_left, speed_right);
        self.left.run_for_degrees(degrees, Some(speed_left))?;
        self.right.run_for_degrees(degrees, Some(speed_right))
    }

    /// Run both members for `rotations` full turns, one after the other.
    pub fn run_for_rotations(
        &self,
        rotations: f64,
        speed_left: Option<i32>,
        speed_right: Option<i32>,
    ) -> Result<(), DeviceError> {
        let (speed_left, speed_right) = self.speeds(speed_left, speed_right);
        self.left.run_for_rotations(rotations, Some(speed_left))?;
        self.right.run_for_rotations(rotations, Some(speed_right))
    }

    /// Run each member to its own absolute angle, one after the other.
    pub fn run_to_position(
        &self,
        degrees_left: f64,
        degrees_right: f64,
        speed: Option<i32>,
    ) -> Result<(), DeviceError> {
        let speed = speed.unwrap_or(self.default_speed);
        self.left.run_to_position(degrees_left, Some(speed))?;
        self.right.run_to_position(degrees_right, Some(speed))
    }

    /// Start both members running continuously.
    pub fn start(
        &self,
        speed_left: Option<i32>,
        speed_right: Option<i32>,
    ) -> Result<(), DeviceError> {
        let (speed_left, speed_right) = self.speeds(speed_left, speed_right);
        self.left.start(Some(speed_left))?;
        self.right.start(Some(speed_right))
    }

    /// Stop both members.
    pub fn stop(&self) -> Result<(), DeviceError> {
        self.left.stop()?;
        self.right.stop()
    }
}
