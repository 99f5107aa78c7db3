//! Rotation-delta filtering.
//!
//! Decouples the raw high-frequency position stream from the user-visible
//! "rotated" event: the handler is invoked only once accumulated position
//! change since the last firing reaches [`ROTATION_EVENT_MIN_DELTA`].

use hatlink_common::consts::ROTATION_EVENT_MIN_DELTA;
use hatlink_common::types::Sample;

/// Baseline-tracking filter for one motor's rotation events.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationFilter {
    baseline: Option<f64>,
}

impl RotationFilter {
    pub const fn new() -> Self {
        Self { baseline: None }
    }

    /// Feed one raw sample.
    ///
    /// The first sample records the baseline and emits nothing. Afterwards
    /// the full sample is re-emitted once `|position − baseline| ≥ 1`, and
    /// the baseline moves to the firing position.
    pub fn observe(&mut self, sample: &Sample) -> Option<Sample> {
        let Some(baseline) = self.baseline else {
            self.baseline = Some(sample.position);
            return None;
        };
        if (sample.position - baseline).abs() >= ROTATION_EVENT_MIN_DELTA {
            self.baseline = Some(sample.position);
            return Some(*sample);
        }
        None
    }
}
