//! One tracked hand: a trail, a debouncer, and the glue between them.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hand_pose::{landmark::INDEX_TIP, FingerState, LandmarkFrame};

use crate::debounce::{DebounceConfig, DebounceState, HandPhase};
use crate::direction::DirectionEvent;
use crate::trail::{TrackerConfig, TrailPoint, TrailReading, TrailTracker};

// ════════════════════════════════════════════════════════════════════════════
// HandSlot
// ════════════════════════════════════════════════════════════════════════════

/// Which hand a session belongs to.  Each slot owns its own state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSlot {
    Left,
    Right,
}

impl HandSlot {
    pub fn all() -> [HandSlot; 2] { [HandSlot::Left, HandSlot::Right] }

    pub fn name(self) -> &'static str {
        match self {
            HandSlot::Left  => "left",
            HandSlot::Right => "right",
        }
    }
}

impl fmt::Display for HandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeOutcome
// ════════════════════════════════════════════════════════════════════════════

/// Everything one frame produced for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeOutcome {
    pub phase:   HandPhase,
    /// `None` when the trail was not fed this frame (no hand, or entering).
    pub reading: Option<TrailReading>,
    pub fingers: Option<FingerState>,
    /// Set only when a direction passed the debouncer.
    pub fired:   Option<DirectionEvent>,
}

impl SwipeOutcome {
    fn quiet(phase: HandPhase, fingers: Option<FingerState>) -> Self {
        SwipeOutcome { phase, reading: None, fingers, fired: None }
    }

    /// Short human-readable state, for status lines.
    pub fn describe(&self) -> String {
        match (self.phase, self.reading) {
            (HandPhase::NoHand, _)                     => "No hand".to_string(),
            (HandPhase::Entering { frames }, _)        => format!("Ignoring hand (just appeared, {})", frames),
            (_, Some(TrailReading::Suppressed))        => "Idle: all fingers up".to_string(),
            (_, Some(TrailReading::Idle { .. }))       => "Idle: hand stationary".to_string(),
            (_, Some(TrailReading::Filling { len }))   => format!("Tracking ({} pts)", len),
            (_, Some(TrailReading::Drifting { magnitude })) => format!("Movement: {:.0} px", magnitude),
            (_, Some(TrailReading::Swipe(ev)))         => match self.fired {
                Some(_) => format!("Gesture: {}", ev),
                None    => format!("Gesture: {} (cooldown)", ev),
            },
            (_, None)                                  => "Tracking".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeSession
// ════════════════════════════════════════════════════════════════════════════

/// Per-hand swipe state.  Frames for one hand must be fed in order, one at a
/// time; two hands need two sessions.
#[derive(Clone, Debug)]
pub struct SwipeSession {
    tracker:  TrailTracker,
    debounce: DebounceState,
}

impl SwipeSession {
    pub fn new(tracker: TrackerConfig, debounce: DebounceConfig) -> Self {
        SwipeSession {
            tracker:  TrailTracker::new(tracker),
            debounce: DebounceState::new(debounce),
        }
    }

    pub fn tracker(&self)  -> &TrailTracker  { &self.tracker }
    pub fn debounce(&self) -> &DebounceState { &self.debounce }
    pub fn phase(&self)    -> HandPhase      { self.debounce.phase() }

    /// Feed one frame's tracked point (`None` = hand absent).
    ///
    /// `suppress` clears the trail without classifying, e.g. for an open palm.
    pub fn step(&mut self, point: Option<TrailPoint>, suppress: bool, now: Instant) -> SwipeOutcome {
        self.step_inner(point, suppress, None, now)
    }

    /// Feed one landmark frame, tracking the index fingertip in a
    /// `width × height` image.  Finger state is derived from the frame; an open
    /// palm suppresses tracking when the tracker is configured to.
    pub fn step_frame(
        &mut self,
        frame:  Option<&LandmarkFrame>,
        size:   (usize, usize),
        now:    Instant,
    ) -> SwipeOutcome {
        let Some(frame) = frame else {
            return self.step_inner(None, false, None, now);
        };
        let fingers  = FingerState::from_frame(frame);
        let suppress = self.tracker.config().suppress_when_all_extended && fingers.all_extended();
        let point    = TrailPoint::from(frame.pixel(INDEX_TIP, size.0, size.1));
        self.step_inner(Some(point), suppress, Some(fingers), now)
    }

    fn step_inner(
        &mut self,
        point:    Option<TrailPoint>,
        suppress: bool,
        fingers:  Option<FingerState>,
        now:      Instant,
    ) -> SwipeOutcome {
        let before = self.debounce.phase();
        let phase  = self.debounce.advance_presence(point.is_some());
        if phase != before {
            debug!(?before, ?phase, "hand phase");
        }

        let point = match (phase, point) {
            (HandPhase::Tracking, Some(p)) => p,
            (HandPhase::NoHand, _) => {
                self.tracker.reset();
                return SwipeOutcome::quiet(phase, fingers);
            }
            _ => return SwipeOutcome::quiet(phase, fingers),
        };

        let reading = self.tracker.observe(point, suppress);
        if let TrailReading::Idle { .. } = reading {
            self.tracker.reset();
        }
        let fired = self.debounce.gate(reading.direction(), now);

        SwipeOutcome { phase, reading: Some(reading), fingers, fired }
    }
}

impl Default for SwipeSession {
    fn default() -> Self {
        SwipeSession::new(TrackerConfig::default(), DebounceConfig::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
