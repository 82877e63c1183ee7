//! Entry suppression and cooldown gating for swipe directions.
//!
//! ```text
//!            hand appears                 counter reaches N
//!   NoHand ───────────────▶ Entering{0} ─────────────────────▶ Tracking
//!      ▲                      │  counter += 1 per frame            │
//!      └──────────────────────┴──────── hand lost ─────────────────┘
//! ```
//!
//! While `Entering`, every direction is dropped.  In `Tracking` a direction
//! fires only if strictly more than `cooldown` has elapsed since the last one
//! fired.  Elapsed time comes from [`Instant`], so wall-clock jumps have no
//! effect, and an earlier-than-last timestamp counts as zero elapsed.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::direction::DirectionEvent;

// ════════════════════════════════════════════════════════════════════════════
// DebounceConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub cooldown_ms:         u64,
    /// Frames ignored after a hand appears (the appearance frame included).
    pub entry_ignore_frames: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig { cooldown_ms: 1000, entry_ignore_frames: 10 }
    }
}

impl DebounceConfig {
    pub fn cooldown(&self) -> Duration { Duration::from_millis(self.cooldown_ms) }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPhase
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPhase {
    NoHand,
    /// `frames` counts present frames after the appearance frame.
    Entering { frames: u32 },
    Tracking,
}

// ════════════════════════════════════════════════════════════════════════════
// DebounceState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct DebounceState {
    config:     DebounceConfig,
    phase:      HandPhase,
    last_fired: Option<Instant>,
}

impl DebounceState {
    pub fn new(config: DebounceConfig) -> Self {
        DebounceState { config, phase: HandPhase::NoHand, last_fired: None }
    }

    pub fn phase(&self)      -> HandPhase       { self.phase }
    pub fn config(&self)     -> &DebounceConfig { &self.config }
    pub fn last_fired(&self) -> Option<Instant> { self.last_fired }

    /// Move the state machine one frame forward and return the new phase.
    ///
    /// The cooldown clock is not touched: a hand that leaves and returns
    /// within the cooldown window still waits out the remainder.
    pub fn advance_presence(&mut self, hand_present: bool) -> HandPhase {
        let limit = self.config.entry_ignore_frames;
        self.phase = match (hand_present, self.phase) {
            (false, _) => HandPhase::NoHand,
            (true, HandPhase::NoHand) if limit == 0 => HandPhase::Tracking,
            (true, HandPhase::NoHand) => HandPhase::Entering { frames: 0 },
            (true, HandPhase::Entering { frames }) => {
                let frames = frames + 1;
                if frames >= limit { HandPhase::Tracking } else { HandPhase::Entering { frames } }
            }
            (true, HandPhase::Tracking) => HandPhase::Tracking,
        };
        self.phase
    }

    /// Apply the cooldown to a candidate direction.  Only meaningful while
    /// tracking; in any other phase nothing fires.
    pub fn gate(&mut self, candidate: Option<DirectionEvent>, now: Instant) -> Option<DirectionEvent> {
        if self.phase != HandPhase::Tracking { return None; }
        let event = candidate?;

        if let Some(last) = self.last_fired {
            let elapsed = now.saturating_duration_since(last);
            if elapsed <= self.config.cooldown() {
                debug!(direction = %event.direction, elapsed_ms = elapsed.as_millis() as u64, "cooling down");
                return None;
            }
        }
        self.last_fired = Some(now);
        debug!(direction = %event.direction, magnitude = event.magnitude, "direction fired");
        Some(event)
    }

    /// One frame: advance presence, then gate the candidate.
    pub fn step(
        &mut self,
        hand_present: bool,
        candidate:    Option<DirectionEvent>,
        now:          Instant,
    ) -> Option<DirectionEvent> {
        self.advance_presence(hand_present);
        self.gate(candidate, now)
    }
}

impl Default for DebounceState {
    fn default() -> Self { DebounceState::new(DebounceConfig::default()) }
}

/// Free-function form of [`DebounceState::step`].
pub fn step_debounce(
    state:        &mut DebounceState,
    hand_present: bool,
    candidate:    Option<DirectionEvent>,
    now:          Instant,
) -> Option<DirectionEvent> {
    state.step(hand_present, candidate, now)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
