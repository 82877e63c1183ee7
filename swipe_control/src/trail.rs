//! Rolling fingertip trail and swipe detection.
//!
//! A [`Trail`] is a fixed-capacity ring of pixel positions in arrival order.
//! [`TrailTracker`] wraps one with the two displacement thresholds:
//!
//! ```text
//!   |oldest → newest|  ≤ idle_threshold        → Idle     (hand stationary)
//!   idle < |d| ≤ movement_threshold            → Drifting (no direction)
//!   |d| > movement_threshold                   → Swipe    (eight-way direction)
//! ```
//!
//! Nothing is classified until the trail is full.  Clearing on `Idle` is left
//! to the caller; clearing on suppression (all fingers up) is done here.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::direction::{Direction, DirectionEvent};

// ════════════════════════════════════════════════════════════════════════════
// TrailPoint / Trail
// ════════════════════════════════════════════════════════════════════════════

/// A tracked point in image pixels (`y` grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
}

impl TrailPoint {
    pub fn new(x: f64, y: f64) -> Self {
        TrailPoint { x, y }
    }
}

impl From<(i32, i32)> for TrailPoint {
    fn from((x, y): (i32, i32)) -> Self {
        TrailPoint::new(x as f64, y as f64)
    }
}

/// Fixed-capacity buffer; pushing past capacity evicts the oldest point.
#[derive(Clone, Debug)]
pub struct Trail {
    points:   VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    /// Capacities below 2 are raised to 2 (a displacement needs two points).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Trail { points: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, p: TrailPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    pub fn clear(&mut self) { self.points.clear(); }

    pub fn len(&self)      -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool  { self.points.is_empty() }
    pub fn is_full(&self)  -> bool  { self.points.len() == self.capacity }
    pub fn capacity(&self) -> usize { self.capacity }

    /// Oldest first.
    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> + '_ {
        self.points.iter()
    }

    /// Straight-line `(dx, dy)` from oldest to newest, once full.
    pub fn displacement(&self) -> Option<(f64, f64)> {
        if !self.is_full() { return None; }
        let first = self.points.front()?;
        let last  = self.points.back()?;
        Some((last.x - first.x, last.y - first.y))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Trail length in frames.
    pub capacity: usize,
    /// Displacement (px) a full trail must exceed to count as a swipe.
    pub movement_threshold_px: f64,
    /// At or below this displacement (px) the hand is considered stationary.
    pub idle_threshold_px: f64,
    /// Treat an open palm (all five fingers extended) as a request to
    /// suppress tracking.  Off by default so all-fingers swipes can be bound.
    pub suppress_when_all_extended: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            capacity:                   5,
            movement_threshold_px:      40.0,
            idle_threshold_px:          15.0,
            suppress_when_all_extended: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrailReading
// ════════════════════════════════════════════════════════════════════════════

/// What one observation of the tracker concluded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrailReading {
    /// Tracking suppressed; the trail was cleared.
    Suppressed,
    /// Not enough points yet.
    Filling { len: usize },
    /// Full trail, displacement at or below the idle threshold.
    Idle { magnitude: f64 },
    /// Full trail, moving but not past the movement threshold.
    Drifting { magnitude: f64 },
    /// Full trail, displacement past the movement threshold.
    Swipe(DirectionEvent),
}

impl TrailReading {
    pub fn direction(&self) -> Option<DirectionEvent> {
        match self {
            TrailReading::Swipe(ev) => Some(*ev),
            _ => None,
        }
    }

    /// Displacement of a full trail, if one was measured.
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            TrailReading::Idle { magnitude } | TrailReading::Drifting { magnitude } => Some(*magnitude),
            TrailReading::Swipe(ev) => Some(ev.magnitude),
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrailTracker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct TrailTracker {
    trail:  Trail,
    config: TrackerConfig,
}

impl TrailTracker {
    pub fn new(config: TrackerConfig) -> Self {
        TrailTracker { trail: Trail::new(config.capacity), config }
    }

    pub fn config(&self) -> &TrackerConfig { &self.config }
    pub fn trail(&self)  -> &Trail         { &self.trail }

    pub fn reset(&mut self) { self.trail.clear(); }

    /// Push `point` and classify the trail.  With `suppress` set the trail is
    /// cleared instead and the point is discarded.
    pub fn observe(&mut self, point: TrailPoint, suppress: bool) -> TrailReading {
        if suppress {
            self.trail.clear();
            return TrailReading::Suppressed;
        }
        self.trail.push(point);

        let Some((dx, dy)) = self.trail.displacement() else {
            return TrailReading::Filling { len: self.trail.len() };
        };
        let magnitude = dx.hypot(dy);
        trace!(dx, dy, magnitude, "trail displacement");

        if magnitude <= self.config.idle_threshold_px {
            TrailReading::Idle { magnitude }
        } else if magnitude <= self.config.movement_threshold_px {
            TrailReading::Drifting { magnitude }
        } else {
            TrailReading::Swipe(DirectionEvent {
                direction: Direction::from_displacement(dx, dy),
                magnitude,
            })
        }
    }
}

impl Default for TrailTracker {
    fn default() -> Self { TrailTracker::new(TrackerConfig::default()) }
}

/// Push one point and return the swipe direction, if the full trail moved
/// further than the movement threshold.
pub fn push_trail_point(tracker: &mut TrailTracker, point: TrailPoint) -> Option<DirectionEvent> {
    tracker.observe(point, false).direction()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(trail: &Trail) -> Vec<(f64, f64)> {
        trail.points().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn ring_keeps_last_five_in_order() {
        let mut t = Trail::new(5);
        for i in 0..7 {
            t.push(TrailPoint::new(i as f64, 0.0));
        }
        assert_eq!(t.len(), 5);
        assert_eq!(pts(&t), vec![(2.0, 0.0), (3.0, 0.0), (4.0, 0.0), (5.0, 0.0), (6.0, 0.0)]);
    }

    #[test]
    fn nothing_until_fifth_point() {
        let mut tr = TrailTracker::default();
        for i in 0..4 {
            assert_eq!(push_trail_point(&mut tr, TrailPoint::new(i as f64 * 30.0, 100.0)), None);
        }
        let ev = push_trail_point(&mut tr, TrailPoint::new(120.0, 100.0)).unwrap();
        assert_eq!(ev.direction, Direction::Right);
        assert!((ev.magnitude - 120.0).abs() < 1e-9);
    }

    #[test]
    fn displacement_is_endpoint_not_path_length() {
        let mut tr = TrailTracker::default();
        // Out and back: long path, zero net displacement.
        for &x in &[100.0, 200.0, 300.0, 200.0, 100.0] {
            tr.observe(TrailPoint::new(x, 50.0), false);
        }
        assert_eq!(tr.trail().displacement(), Some((0.0, 0.0)));
    }

    #[test]
    fn thresholds_split_idle_drift_swipe() {
        let reading = |dx: f64| {
            let mut tr = TrailTracker::default();
            let mut last = TrailReading::Filling { len: 0 };
            for i in 0..5 {
                last = tr.observe(TrailPoint::new(dx * i as f64 / 4.0, 0.0), false);
            }
            last
        };
        assert!(matches!(reading(15.0), TrailReading::Idle { .. }));
        assert!(matches!(reading(16.0), TrailReading::Drifting { .. }));
        assert!(matches!(reading(40.0), TrailReading::Drifting { .. }));
        assert!(matches!(reading(41.0), TrailReading::Swipe(_)));
    }

    #[test]
    fn upward_swipe_in_image_space() {
        let mut tr = TrailTracker::default();
        let mut last = None;
        for i in 0..5 {
            last = push_trail_point(&mut tr, TrailPoint::new(200.0, 300.0 - 20.0 * i as f64));
        }
        assert_eq!(last.map(|e| e.direction), Some(Direction::Up));
    }

    #[test]
    fn suppression_clears_and_emits_nothing() {
        let mut tr = TrailTracker::default();
        for i in 0..4 {
            tr.observe(TrailPoint::new(i as f64 * 50.0, 0.0), false);
        }
        assert_eq!(tr.observe(TrailPoint::new(250.0, 0.0), true), TrailReading::Suppressed);
        assert!(tr.trail().is_empty());
    }

    #[test]
    fn tiny_capacity_is_raised() {
        assert_eq!(Trail::new(0).capacity(), 2);
    }
}
