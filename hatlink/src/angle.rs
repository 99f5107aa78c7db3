//! Shortest-path angle normalization.
//!
//! Converts an absolute target angle (0–359, wrapping) plus the current
//! continuous relative position and current absolute position into a
//! continuous target for the motion generator, guaranteeing the shaft
//! turns at most 180° in magnitude, never the long way around.

use hatlink_common::consts::DEGREES_PER_ROTATION;

/// Signed shortest angular delta from `current_abs` to `target`, in
/// degrees, in the half-open interval `(-180, 180]`.
///
/// Satisfies `(current_abs + delta).rem_euclid(360) == target` for all
/// inputs in `[0, 360)`. The exact half-turn tie resolves to `+180`.
#[inline]
pub fn shortest_delta(target: f64, current_abs: f64) -> f64 {
    180.0 - (180.0 - (target - current_abs)).rem_euclid(DEGREES_PER_ROTATION)
}

/// Continuous target, in rotations, that reaches `delta` degrees away from
/// the current relative position `current_rel` (degrees).
#[inline]
pub fn absolute_target(current_rel: f64, delta: f64) -> f64 {
    (current_rel + delta) / DEGREES_PER_ROTATION
}
