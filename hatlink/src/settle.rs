//! Sample-driven settling detection.
//!
//! The motion generator behind the driver produces a velocity profile with
//! no discrete "move complete" signal, so completion is declared
//! statistically: once the last [`SETTLE_WINDOW`] positions vary by less
//! than [`SETTLE_STDEV_LIMIT`], the shaft has ceased decelerating and the
//! motion counts as settled.

use hatlink_common::consts::{SETTLE_STDEV_LIMIT, SETTLE_WINDOW};
use heapless::{Deque, Vec};

/// Signal posted through the motor's gate on every observed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleSignal {
    /// Relative position of the sample that produced this signal.
    pub position: f64,
    /// True once the window is full and its spread is below the limit.
    pub settled: bool,
}

/// Bounded FIFO of recent positions with settling judgement.
///
/// A window that never fills (device disconnected mid-move) never reports
/// settled, so a wait built on it blocks forever; that risk is owned by
/// the caller via the optional configured wait bound.
#[derive(Debug, Default)]
pub struct SettleWindow {
    window: Deque<f64, SETTLE_WINDOW>,
}

impl SettleWindow {
    pub fn new() -> Self {
        Self {
            window: Deque::new(),
        }
    }

    /// Push a position, evicting the oldest past capacity, and judge
    /// settling. Returns true iff the window holds exactly
    /// [`SETTLE_WINDOW`] samples whose sample standard deviation is below
    /// [`SETTLE_STDEV_LIMIT`].
    pub fn observe(&mut self, position: f64) -> bool {
        if self.window.is_full() {
            self.window.pop_front();
        }
        // Cannot fail: a slot was just freed if the window was full.
        let _ = self.window.push_back(position);
        if !self.window.is_full() {
            return false;
        }
        // The deque's iterator is not `Clone`, which `sample_stdev` requires;
        // materialize the full window into a fixed-capacity buffer whose
        // slice iterator is `Clone`.
        let samples: Vec<f64, SETTLE_WINDOW> = self.window.iter().copied().collect();
        sample_stdev(samples.iter().copied()) < SETTLE_STDEV_LIMIT
    }

    /// Clear the window at the start of a new command.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

/// Sample standard deviation (n − 1 denominator) of at least two values.
///
/// ```text
/// s = sqrt( Σ(xᵢ − x̄)² / (n − 1) )
/// ```
pub fn sample_stdev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
