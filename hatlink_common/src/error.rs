//! Error types for the device layer and the driver boundary.
//!
//! `DriverError` covers failures inside the low-level transport; the device
//! layer wraps it in `DeviceError` and adds attach-time and parameter
//! validation failures. All failures surface synchronously to the immediate
//! caller; no retries anywhere in this layer.

use crate::types::Port;
use thiserror::Error;

/// Error types for low-level driver operations.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Hardware communication error
    #[error("hardware communication error: {0}")]
    CommunicationError(String),

    /// Device is no longer attached
    #[error("device disconnected")]
    Disconnected,

    /// The driver rejected a command value
    #[error("driver rejected command: {0}")]
    Rejected(String),
}

/// Error types for device-layer operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The attached device is not a recognized motor.
    #[error("there is not a motor connected to port {port} (found type {found})")]
    NotAMotor { port: Port, found: u16 },

    /// The attached device is not a distance sensor.
    #[error("there is not a distance sensor connected to port {port} (found type {found})")]
    NotADistanceSensor { port: Port, found: u16 },

    /// Speed outside the documented range. Raised before any driver call.
    #[error("invalid speed {speed} (expected {min}..={max})")]
    InvalidSpeed { speed: i32, min: i32, max: i32 },

    /// Absolute target outside `[0, 360)`.
    #[error("invalid target angle {degrees} (expected 0..360)")]
    InvalidTarget { degrees: f64 },

    /// Settling did not occur within the configured bound.
    #[error("motion did not settle within {timeout_s:.1}s")]
    SettleTimeout { timeout_s: f64 },

    /// An in-flight command was cancelled; the actuator has been coasted.
    #[error("command cancelled")]
    Cancelled,

    /// A command worker could not be spawned.
    #[error("failed to spawn command worker: {0}")]
    SpawnFailed(String),

    /// A command worker terminated without reporting a result.
    #[error("command worker terminated abnormally")]
    WorkerLost,

    /// Failure propagated from the transport.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Invalid device configuration.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
