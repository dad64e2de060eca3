//! One axis worth of range-filter handles.
//!
//! Positions are in track space: visualization-local units along the axis.
//! After every clamp `track_min <= min_pos <= max_pos <= track_max` holds.

use brushlink_core::SceneError;
use serde::{Deserialize, Serialize};

/// Which of the two handles on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Min,
    Max,
}

impl Handle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Min => "min",
            Handle::Max => "max",
        }
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approximate float equality, relative for large magnitudes.
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    if a == b {
        return true;
    }
    let scale = 1.0_f32.max(a.abs()).max(b.abs());
    (a - b).abs() <= epsilon * scale
}

/// Linear map of `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
pub fn normalise(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    (value - from_min) / (from_max - from_min) * (to_max - to_min) + to_min
}

/// Handle positions and guards for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRange {
    track_min: f32,
    track_max: f32,
    min_pos: f32,
    max_pos: f32,
    prev_min: f32,
    prev_max: f32,
    threshold: Option<f32>,
    min_hit_testable: bool,
    max_hit_testable: bool,
}

impl FilterRange {
    /// A range spanning the whole track.
    pub fn new(axis: &str, track_min: f32, track_max: f32) -> Result<Self, SceneError> {
        if !(track_min.is_finite() && track_max.is_finite() && track_min < track_max) {
            return Err(SceneError::InvalidTrack {
                axis: axis.to_string(),
                start: track_min,
                end: track_max,
            });
        }
        Ok(Self {
            track_min,
            track_max,
            min_pos: track_min,
            max_pos: track_max,
            prev_min: track_min,
            prev_max: track_max,
            threshold: None,
            min_hit_testable: true,
            max_hit_testable: true,
        })
    }

    pub fn track_min(&self) -> f32 {
        self.track_min
    }

    pub fn track_max(&self) -> f32 {
        self.track_max
    }

    pub fn min_pos(&self) -> f32 {
        self.min_pos
    }

    pub fn max_pos(&self) -> f32 {
        self.max_pos
    }

    pub fn position(&self, handle: Handle) -> f32 {
        match handle {
            Handle::Min => self.min_pos,
            Handle::Max => self.max_pos,
        }
    }

    /// Moves a handle without clamping. Call [`clamp_and_anchor`] afterwards.
    ///
    /// [`clamp_and_anchor`]: FilterRange::clamp_and_anchor
    pub fn set_raw(&mut self, handle: Handle, position: f32) {
        match handle {
            Handle::Min => self.min_pos = position,
            Handle::Max => self.max_pos = position,
        }
    }

    /// Snap target in track space, if a task threshold applies.
    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    /// Sets the snap target, clamped onto the track.
    pub fn set_threshold(&mut self, threshold: Option<f32>) {
        self.threshold = threshold
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(self.track_min, self.track_max));
    }

    pub fn is_hit_testable(&self, handle: Handle) -> bool {
        match handle {
            Handle::Min => self.min_hit_testable,
            Handle::Max => self.max_hit_testable,
        }
    }

    /// Restores ordering after a move.
    ///
    /// The handle that did not move anchors the one that did. When both
    /// moved, min is clamped to the track first and max follows it.
    pub fn clamp_and_anchor(&mut self, epsilon: f32) {
        let (lo, hi) = (self.track_min, self.track_max);
        let mut min = self.min_pos;
        let mut max = self.max_pos;

        if approx_eq(self.prev_min, min, epsilon) {
            max = max.clamp(min.clamp(lo, hi), hi);
            min = min.clamp(lo, max);
        } else if approx_eq(self.prev_max, max, epsilon) {
            max = max.clamp(lo, hi);
            min = min.clamp(lo, max);
        } else {
            min = min.clamp(lo, hi);
            max = max.clamp(min, hi);
        }

        self.min_pos = min;
        self.max_pos = max;
        self.prev_min = min;
        self.prev_max = max;
        self.assert_ordered();
    }

    /// Pulls handles near the threshold onto it.
    ///
    /// Only quantitative axes snap, and never from an extreme.
    pub fn snap(&mut self, snap_epsilon: f32, handle_epsilon: f32, quantitative: bool) {
        let Some(threshold) = self.threshold.filter(|_| quantitative) else {
            return;
        };
        if !self.at_extreme(Handle::Min, handle_epsilon)
            && (self.min_pos - threshold).abs() < snap_epsilon
        {
            self.min_pos = threshold;
        }
        if !self.at_extreme(Handle::Max, handle_epsilon)
            && (self.max_pos - threshold).abs() < snap_epsilon
        {
            self.max_pos = threshold;
        }
        // Snapping both past each other would break ordering.
        if self.min_pos > self.max_pos {
            self.min_pos = self.max_pos;
        }
        self.prev_min = self.min_pos;
        self.prev_max = self.max_pos;
        self.assert_ordered();
    }

    /// Disables hit-testing on a handle buried under its partner at an end.
    pub fn update_hit_testing(&mut self, epsilon: f32) {
        let at = |pos: f32, end: f32| approx_eq(pos, end, epsilon);
        if at(self.min_pos, self.track_min) && at(self.max_pos, self.track_min) {
            self.min_hit_testable = false;
        } else if at(self.min_pos, self.track_max) && at(self.max_pos, self.track_max) {
            self.max_hit_testable = false;
        } else {
            self.min_hit_testable = true;
            self.max_hit_testable = true;
        }
    }

    /// Is the handle resting on its own end of the track?
    pub fn at_extreme(&self, handle: Handle, epsilon: f32) -> bool {
        match handle {
            Handle::Min => approx_eq(self.min_pos, self.track_min, epsilon),
            Handle::Max => approx_eq(self.max_pos, self.track_max, epsilon),
        }
    }

    /// True once the handle has left its end by more than `epsilon`.
    pub fn guide_visible(&self, handle: Handle, epsilon: f32) -> bool {
        match handle {
            Handle::Min => self.min_pos >= self.track_min + epsilon,
            Handle::Max => self.max_pos <= self.track_max - epsilon,
        }
    }

    /// Handle value in data space, given the axis domain.
    pub fn data_value(&self, handle: Handle, domain_min: f32, domain_max: f32) -> f32 {
        normalise(
            self.position(handle),
            self.track_min,
            self.track_max,
            domain_min,
            domain_max,
        )
    }

    /// Track position of a data-space value.
    pub fn track_position(&self, value: f32, domain_min: f32, domain_max: f32) -> f32 {
        normalise(value, domain_min, domain_max, self.track_min, self.track_max)
    }

    /// Both handles back to the ends, both hit-testable.
    pub fn reset(&mut self) {
        self.min_pos = self.track_min;
        self.max_pos = self.track_max;
        self.prev_min = self.track_min;
        self.prev_max = self.track_max;
        self.min_hit_testable = true;
        self.max_hit_testable = true;
    }

    /// Whether the handles cover the full track.
    pub fn is_full(&self, epsilon: f32) -> bool {
        self.at_extreme(Handle::Min, epsilon) && self.at_extreme(Handle::Max, epsilon)
    }

    fn assert_ordered(&self) {
        assert!(
            self.track_min <= self.min_pos
                && self.min_pos <= self.max_pos
                && self.max_pos <= self.track_max,
            "filter handles out of order: {} <= {} <= {} <= {}",
            self.track_min,
            self.min_pos,
            self.max_pos,
            self.track_max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn range() -> FilterRange {
        FilterRange::new("Price", -0.5, 0.5).unwrap()
    }

    #[test]
    fn test_invalid_track_rejected() {
        assert!(matches!(
            FilterRange::new("Price", 0.5, 0.5),
            Err(SceneError::InvalidTrack { .. })
        ));
        assert!(FilterRange::new("Price", f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_max_anchors_min() {
        let mut r = range();
        r.set_raw(Handle::Max, 0.0);
        r.clamp_and_anchor(EPS);
        r.set_raw(Handle::Min, 0.3);
        r.clamp_and_anchor(EPS);
        assert_eq!(r.min_pos(), 0.0);
        assert_eq!(r.max_pos(), 0.0);
    }

    #[test]
    fn test_min_anchors_max() {
        let mut r = range();
        r.set_raw(Handle::Min, 0.1);
        r.clamp_and_anchor(EPS);
        r.set_raw(Handle::Max, -0.2);
        r.clamp_and_anchor(EPS);
        assert_eq!(r.max_pos(), 0.1);
        r.set_raw(Handle::Max, 0.9);
        r.clamp_and_anchor(EPS);
        assert_eq!(r.max_pos(), 0.5);
    }

    #[test]
    fn test_both_moved_min_wins() {
        let mut r = range();
        r.set_raw(Handle::Min, 0.4);
        r.set_raw(Handle::Max, 0.2);
        r.clamp_and_anchor(EPS);
        assert_eq!(r.min_pos(), 0.4);
        assert_eq!(r.max_pos(), 0.4);
    }

    #[test]
    fn test_snap_skips_extremes_and_categorical() {
        let mut r = range();
        r.set_threshold(Some(0.1));
        r.set_raw(Handle::Min, 0.105);
        r.clamp_and_anchor(EPS);

        r.snap(0.01, EPS, false);
        assert_eq!(r.min_pos(), 0.105);

        r.snap(0.01, EPS, true);
        assert_eq!(r.min_pos(), 0.1);

        let mut edge = range();
        edge.set_threshold(Some(-0.495));
        edge.snap(0.01, EPS, true);
        assert_eq!(edge.min_pos(), -0.5);
    }

    #[test]
    fn test_off_track_threshold_keeps_handles_ordered() {
        let mut r = range();
        r.set_threshold(Some(0.505));
        assert_eq!(r.threshold(), Some(0.5));

        r.set_raw(Handle::Max, 0.497);
        r.clamp_and_anchor(EPS);
        r.snap(0.01, EPS, true);
        assert_eq!(r.max_pos(), 0.5);
        assert!(r.min_pos() <= r.max_pos());

        r.set_threshold(Some(f32::NAN));
        assert_eq!(r.threshold(), None);
    }

    #[test]
    fn test_overlap_guard() {
        let mut r = range();
        r.set_raw(Handle::Max, -0.5);
        r.clamp_and_anchor(EPS);
        r.update_hit_testing(EPS);
        assert!(!r.is_hit_testable(Handle::Min));
        assert!(r.is_hit_testable(Handle::Max));

        r.set_raw(Handle::Max, 0.2);
        r.clamp_and_anchor(EPS);
        r.update_hit_testing(EPS);
        assert!(r.is_hit_testable(Handle::Min));

        r.set_raw(Handle::Min, 0.5);
        r.set_raw(Handle::Max, 0.5);
        r.clamp_and_anchor(EPS);
        r.update_hit_testing(EPS);
        assert!(!r.is_hit_testable(Handle::Max));
    }

    #[test]
    fn test_guides_and_data_values() {
        let mut r = range();
        assert!(!r.guide_visible(Handle::Min, EPS));
        assert!(!r.guide_visible(Handle::Max, EPS));

        r.set_raw(Handle::Min, 0.0);
        r.clamp_and_anchor(EPS);
        assert!(r.guide_visible(Handle::Min, EPS));
        assert!((r.data_value(Handle::Min, 0.0, 10.0) - 5.0).abs() < 1e-4);
        assert!((r.track_position(2.5, 0.0, 10.0) + 0.25).abs() < 1e-6);

        r.reset();
        assert!(r.is_full(EPS));
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.0, 0.000001, EPS));
        assert!(!approx_eq(0.0, 0.001, EPS));
        assert!(approx_eq(1000.0, 1000.001, EPS));
    }
}
