//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use hatlink_common::prelude::*;` and get
//! the most important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, DistanceSensorConfig, HatConfig, MotorConfig};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{DeviceError, DriverError};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{NO_READING, SETTLE_STDEV_LIMIT, SETTLE_WINDOW};

// ─── Types ──────────────────────────────────────────────────────────
pub use crate::types::{Port, PortInfo, ReportChannels, Sample};

// ─── Driver boundary ────────────────────────────────────────────────
pub use crate::driver::{DistanceDriver, MotorDriver, PortDriver};
