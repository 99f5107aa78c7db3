//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! for hatlink applications, plus the per-device configuration structs.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hatlink_common::config::{ConfigLoader, HatConfig};
//! use std::path::Path;
//!
//! let config = HatConfig::load(Path::new("hat.toml")).unwrap();
//! assert!(config.motor.default_speed <= 100);
//! ```

use crate::consts::{SPEED_MAX, SPEED_MIN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Per-motor configuration.
///
/// Replaces the ambient mutable default-speed field of older device stacks:
/// every motor instance carries its own explicit configuration, and call
/// sites override per invocation.
///
/// # TOML Example
///
/// ```toml
/// [motor]
/// default_speed = 20
/// power_limit = 0.7
/// bias = 0.3
/// release = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorConfig {
    /// Speed used when a command omits one. Range −100..=100.
    #[serde(default = "default_speed")]
    pub default_speed: i32,

    /// Power limit applied at attach time. Range 0.0..=1.0.
    #[serde(default = "default_power_limit")]
    pub power_limit: f64,

    /// Drive bias applied at attach time. Range 0.0..=1.0.
    #[serde(default = "default_bias")]
    pub bias: f64,

    /// Coast (remove power) once a motion settles. When false, completed
    /// commands hold power at the final position.
    #[serde(default = "default_release")]
    pub release: bool,

    /// Optional upper bound, in seconds, on waiting for a motion to settle.
    /// Unset means wait indefinitely; a motion that never settles blocks
    /// its waiter.
    #[serde(default)]
    pub settle_max_wait: Option<f64>,
}

fn default_speed() -> i32 {
    20
}
fn default_power_limit() -> f64 {
    0.7
}
fn default_bias() -> f64 {
    0.3
}
fn default_release() -> bool {
    true
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            power_limit: default_power_limit(),
            bias: default_bias(),
            release: default_release(),
            settle_max_wait: None,
        }
    }
}

impl MotorConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `default_speed` is outside −100..=100
    /// - `power_limit` or `bias` is outside 0.0..=1.0
    /// - `settle_max_wait` is non-positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_speed < SPEED_MIN || self.default_speed > SPEED_MAX {
            return Err(ConfigError::ValidationError(format!(
                "default_speed {} outside {}..={}",
                self.default_speed, SPEED_MIN, SPEED_MAX
            )));
        }
        if !(0.0..=1.0).contains(&self.power_limit) {
            return Err(ConfigError::ValidationError(format!(
                "power_limit {} outside 0.0..=1.0",
                self.power_limit
            )));
        }
        if !(0.0..=1.0).contains(&self.bias) {
            return Err(ConfigError::ValidationError(format!(
                "bias {} outside 0.0..=1.0",
                self.bias
            )));
        }
        if let Some(bound) = self.settle_max_wait {
            if bound <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "settle_max_wait {bound} must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// Per-sensor configuration for the distance sensor.
///
/// # TOML Example
///
/// ```toml
/// [distance_sensor]
/// threshold_distance = 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceSensorConfig {
    /// Hysteresis threshold in millimetres for in/out-of-range events.
    #[serde(default = "default_threshold_distance")]
    pub threshold_distance: i32,
}

fn default_threshold_distance() -> i32 {
    100
}

impl Default for DistanceSensorConfig {
    fn default() -> Self {
        Self {
            threshold_distance: default_threshold_distance(),
        }
    }
}

impl DistanceSensorConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `threshold_distance` is
    /// negative (the sentinel −1 is not a valid threshold).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold_distance < 0 {
            return Err(ConfigError::ValidationError(format!(
                "threshold_distance {} must be non-negative",
                self.threshold_distance
            )));
        }
        Ok(())
    }
}

/// Top-level hat configuration: one section per device role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatConfig {
    /// Motor defaults.
    #[serde(default)]
    pub motor: MotorConfig,

    /// Distance sensor defaults.
    #[serde(default)]
    pub distance_sensor: DistanceSensorConfig,
}

impl HatConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motor.validate()?;
        self.distance_sensor.validate()?;
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load and parse a TOML configuration file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

impl ConfigLoader for HatConfig {}
impl ConfigLoader for MotorConfig {}
impl ConfigLoader for DistanceSensorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_defaults_are_valid() {
        let config = MotorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_speed, 20);
        assert!(config.release);
        assert!(config.settle_max_wait.is_none());
    }

    #[test]
    fn motor_speed_bounds() {
        let config = MotorConfig {
            default_speed: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MotorConfig {
            default_speed: -100,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn motor_power_limit_bounds() {
        let config = MotorConfig {
            power_limit: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn settle_wait_must_be_positive() {
        let config = MotorConfig {
            settle_max_wait: Some(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MotorConfig {
            settle_max_wait: Some(2.5),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sensor_threshold_non_negative() {
        let config = DistanceSensorConfig {
            threshold_distance: -1,
        };
        assert!(config.validate().is_err());
    }
}
