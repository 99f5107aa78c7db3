//! Driver boundary traits.
//!
//! This module defines the interface the synchronization core consumes from
//! the low-level transport:
//! - `PortDriver` trait - attach-time identity and reporting configuration
//! - `MotorDriver` trait - motion commands and the motor sample stream
//! - `DistanceDriver` trait - distance readings and their sample stream
//!
//! Serial framing, port enumeration and unit conversion live behind these
//! traits and are not reimplemented here.

use crate::error::DriverError;
use crate::types::{DistanceCallback, PortInfo, ReportChannels, Sample, SampleCallback};
use std::time::Duration;

/// Interface every attached device exposes.
///
/// # Lifecycle
///
/// 1. `info()` - queried once at attach time to validate device identity
/// 2. `select_reporting()` - configures which channels arrive per sample
/// 3. callback registration (on the subtrait) - starts the delivery context
///
/// # Delivery context
///
/// The transport invokes the registered callback from its own context
/// whenever a new sample arrives, concurrently with all caller threads.
/// The slot is single and replaceable: registering a new handler replaces
/// the previous one. Handlers must not block.
pub trait PortDriver: Send + Sync {
    /// Identity of the attached device, as reported by the firmware.
    fn info(&self) -> Result<PortInfo, DriverError>;

    /// Configure which data channels the device reports on every sample.
    fn select_reporting(&self, channels: ReportChannels) -> Result<(), DriverError>;

    /// Invert the sign convention of reported values.
    fn reverse(&self) -> Result<(), DriverError>;
}

/// Motor transport: motion-profile commands plus the raw sample stream.
///
/// Positions handed to `run_for_degrees` are continuous rotations (degrees
/// divided by 360); the profile generator behind the trait produces the
/// position stream observed through the callback.
pub trait MotorDriver: PortDriver {
    /// Register the sample delivery handler. Single slot; replaces any
    /// previously registered handler.
    fn set_callback(&self, callback: SampleCallback) -> Result<(), DriverError>;

    /// Synchronous point read of (speed, position, absolute position).
    fn get(&self) -> Result<Sample, DriverError>;

    /// Hand a position profile to the motion generator: drive from `origin`
    /// to `target` (both in rotations) at `speed` percent.
    fn run_for_degrees(&self, target: f64, origin: f64, speed: i32) -> Result<(), DriverError>;

    /// Drive at `speed` percent for `duration`, then stop. Blocks the
    /// calling thread for the duration.
    fn run_for_time(&self, duration: Duration, speed: i32) -> Result<(), DriverError>;

    /// Drive continuously at `speed` percent until further notice.
    fn run_at_speed(&self, speed: i32) -> Result<(), DriverError>;

    /// Remove drive power, letting the shaft spin freely to rest.
    fn coast(&self) -> Result<(), DriverError>;

    /// Limit drive power to `limit` (0.0..=1.0).
    fn power_limit(&self, limit: f64) -> Result<(), DriverError>;

    /// Set the drive bias (0.0..=1.0).
    fn bias(&self, bias: f64) -> Result<(), DriverError>;
}

/// Distance sensor transport.
pub trait DistanceDriver: PortDriver {
    /// Register the reading delivery handler. Single slot; replaces any
    /// previously registered handler.
    fn set_callback(&self, callback: DistanceCallback) -> Result<(), DriverError>;

    /// Synchronous point read of the current distance in millimetres.
    fn read_distance(&self) -> Result<i32, DriverError>;
}
