//! System-wide constants for the hatlink workspace.
//!
//! Single source of truth for device type ids, settling parameters and
//! event thresholds. Imported by both crates; no duplication permitted.

use static_assertions::const_assert;

/// Type ids reported by recognized motors.
///
/// Matches the scheduler's motor table on the hat firmware side.
pub const MOTOR_TYPE_IDS: [u16; 8] = [38, 46, 47, 48, 49, 65, 75, 76];

/// Type id reported by the ultrasonic distance sensor.
pub const DISTANCE_SENSOR_TYPE_ID: u16 = 62;

/// Number of recent position samples inspected for settling.
pub const SETTLE_WINDOW: usize = 5;

/// Sample standard deviation (degrees) below which a motion counts as settled.
pub const SETTLE_STDEV_LIMIT: f64 = 1.0;

/// Minimum accumulated position change (degrees) before a rotation event fires.
pub const ROTATION_EVENT_MIN_DELTA: f64 = 1.0;

/// Distance reading meaning "no valid reading". Never triggers events or waits.
pub const NO_READING: i32 = -1;

/// Degrees per full output-shaft rotation.
pub const DEGREES_PER_ROTATION: f64 = 360.0;

/// Speed command range for signed (directional) commands.
pub const SPEED_MIN: i32 = -100;
pub const SPEED_MAX: i32 = 100;

// Sample standard deviation needs at least two samples.
const_assert!(SETTLE_WINDOW >= 2);

/// Returns true if `type_id` identifies a recognized motor.
#[inline]
pub fn is_motor_type(type_id: u16) -> bool {
    MOTOR_TYPE_IDS.contains(&type_id)
}
