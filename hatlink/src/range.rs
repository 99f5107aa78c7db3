//! Hysteresis edge trigger for the distance stream.
//!
//! Converts a continuous distance stream plus one threshold into two
//! mutually exclusive, edge-triggered events. For any monotonic run of
//! samples on one side of the threshold the corresponding event fires at
//! most once; it re-fires only after the distance has crossed to the
//! opposite side and back.

use hatlink_common::consts::NO_READING;

/// Event produced by a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvent {
    /// Distance dropped below the threshold.
    Entered,
    /// Distance rose above the threshold.
    Left,
}

/// Edge-trigger state for one distance sensor.
///
/// The trigger starts on the out-of-range side: a stream that begins
/// beyond the threshold fires nothing until it first comes into range.
#[derive(Debug, Clone)]
pub struct RangeTrigger {
    threshold: i32,
    fired_in: bool,
    fired_out: bool,
}

impl RangeTrigger {
    pub const fn new(threshold: i32) -> Self {
        Self {
            threshold,
            fired_in: false,
            fired_out: true,
        }
    }

    /// Feed one distance reading.
    ///
    /// The sentinel reading ([`NO_READING`]) never changes state. A reading
    /// exactly on the threshold is a dead zone: it triggers neither edge.
    /// The two fired flags are never both set.
    pub fn observe(&mut self, distance: i32) -> Option<RangeEvent> {
        if distance == NO_READING {
            return None;
        }
        if distance < self.threshold && !self.fired_in {
            self.fired_in = true;
            self.fired_out = false;
            return Some(RangeEvent::Entered);
        }
        if distance > self.threshold && !self.fired_out {
            self.fired_out = true;
            self.fired_in = false;
            return Some(RangeEvent::Left);
        }
        None
    }

    #[inline]
    pub const fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Change the threshold. Fired state is kept: the next event still
    /// requires a crossing relative to the side already reported.
    pub fn set_threshold(&mut self, threshold: i32) {
        self.threshold = threshold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_out_of_range_run_is_silent() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(150), None);
        assert_eq!(trigger.observe(150), None);
    }

    #[test]
    fn fires_once_per_monotonic_run() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(80), Some(RangeEvent::Entered));
        assert_eq!(trigger.observe(70), None);
        assert_eq!(trigger.observe(60), None);
        assert_eq!(trigger.observe(150), Some(RangeEvent::Left));
        assert_eq!(trigger.observe(160), None);
    }

    #[test]
    fn refires_only_after_opposite_crossing() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(80), Some(RangeEvent::Entered));
        assert_eq!(trigger.observe(150), Some(RangeEvent::Left));
        assert_eq!(trigger.observe(80), Some(RangeEvent::Entered));
    }

    #[test]
    fn sentinel_never_changes_state() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(NO_READING), None);
        assert_eq!(trigger.observe(80), Some(RangeEvent::Entered));
        assert_eq!(trigger.observe(NO_READING), None);
        // Sentinel did not count as an opposite crossing.
        assert_eq!(trigger.observe(70), None);
    }

    #[test]
    fn threshold_value_is_a_dead_zone() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(100), None);
        assert_eq!(trigger.observe(100), None);
        assert_eq!(trigger.observe(99), Some(RangeEvent::Entered));
    }

    #[test]
    fn down_then_up_crossing_sequence() {
        // One down-crossing (150→80) and one up-crossing (80→150):
        // exactly one event of each kind, the Left at the final sample.
        let samples = [150, 150, 80, 80, 150];
        let mut trigger = RangeTrigger::new(100);
        let events: Vec<_> = samples.iter().filter_map(|d| trigger.observe(*d)).collect();
        assert_eq!(events, vec![RangeEvent::Entered, RangeEvent::Left]);
    }

    #[test]
    fn threshold_is_mutable_at_runtime() {
        let mut trigger = RangeTrigger::new(100);
        assert_eq!(trigger.observe(80), Some(RangeEvent::Entered));
        trigger.set_threshold(50);
        assert_eq!(trigger.threshold(), 50);
        // 80 is now above the threshold: fires the out edge.
        assert_eq!(trigger.observe(80), Some(RangeEvent::Left));
    }
}
