//! Rock-paper-scissors against the computer.
//!
//! A round is a four-step countdown (`1`, `2`, `3`, `THROW!`, one second
//! each), after which the player's current classification is judged against
//! a random computer throw.  The outcome banner stays up for two seconds.
//!
//! Everything here is clock-free: callers pass `Instant`s in, so the game can
//! be driven by a render loop or by a test.

use std::fmt;
use std::time::{Duration, Instant};

use crate::classifier::{ClassificationResult, GestureLabel};

pub const COUNTDOWN: [&str; 4] = ["1", "2", "3", "THROW!"];
pub const STEP: Duration = Duration::from_millis(1000);
pub const RESULT_HOLD: Duration = Duration::from_millis(2000);

// ════════════════════════════════════════════════════════════════════════════
// Throw / Outcome
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    pub fn all() -> [Throw; 3] { [Throw::Rock, Throw::Paper, Throw::Scissors] }

    /// Matches the exemplar gesture names.
    pub fn name(self) -> &'static str {
        match self {
            Throw::Rock     => "rock",
            Throw::Paper    => "paper",
            Throw::Scissors => "scissors",
        }
    }

    pub fn from_name(name: &str) -> Option<Throw> {
        Throw::all().into_iter().find(|t| t.name() == name)
    }

    pub fn beats(self, other: Throw) -> bool {
        matches!(
            (self, other),
            (Throw::Rock, Throw::Scissors) | (Throw::Scissors, Throw::Paper) | (Throw::Paper, Throw::Rock)
        )
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
    /// No hand, an ambiguous hand, or a gesture that is not a throw.
    Unreadable,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::Win        => "YOU WIN!",
            Outcome::Lose       => "YOU LOSE!",
            Outcome::Draw       => "DRAW!",
            Outcome::Unreadable => "COULDN'T READ HAND",
        }
    }
}

/// Judge the player's classified hand against the computer's throw.
pub fn judge(player: &ClassificationResult, computer: Throw) -> Outcome {
    let throw = match &player.label {
        GestureLabel::Known(name) => Throw::from_name(name),
        GestureLabel::Unknown     => None,
    };
    match throw {
        None                         => Outcome::Unreadable,
        Some(t) if t == computer     => Outcome::Draw,
        Some(t) if t.beats(computer) => Outcome::Win,
        Some(_)                      => Outcome::Lose,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ThrowPicker
// ════════════════════════════════════════════════════════════════════════════

/// Seedable source of computer throws (xorshift64*).
#[derive(Clone, Debug)]
pub struct ThrowPicker {
    state: u64,
}

impl ThrowPicker {
    pub fn new(seed: u64) -> Self {
        ThrowPicker { state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1 }
    }

    pub fn next(&mut self) -> Throw {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        let r = self.state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32;
        Throw::all()[(r % 3) as usize]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RpsGame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub player:   GestureLabel,
    pub computer: Throw,
    pub outcome:  Outcome,
}

impl Round {
    pub fn describe(&self) -> String {
        format!("{}  You: {} | Computer: {}", self.outcome.banner(), self.player, self.computer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Countdown { started: Instant },
    Showing { until: Instant },
}

#[derive(Clone, Debug)]
pub struct RpsGame {
    picker: ThrowPicker,
    phase:  Phase,
    last:   Option<Round>,
}

impl RpsGame {
    pub fn new(seed: u64) -> Self {
        RpsGame { picker: ThrowPicker::new(seed), phase: Phase::Idle, last: None }
    }

    /// Begin a countdown.  Ignored (returns `false`) while one is running.
    pub fn start(&mut self, now: Instant) -> bool {
        if matches!(self.phase, Phase::Countdown { .. }) {
            return false;
        }
        self.phase = Phase::Countdown { started: now };
        true
    }

    pub fn is_counting(&self) -> bool { matches!(self.phase, Phase::Countdown { .. }) }

    /// Advance the game.  Returns the finished round exactly once, on the
    /// first tick after the countdown has run out; `player` is whatever the
    /// classifier says at that moment (`None` when no hand is visible).
    pub fn tick(&mut self, now: Instant, player: Option<&ClassificationResult>) -> Option<Round> {
        match self.phase {
            Phase::Countdown { started }
                if now.saturating_duration_since(started) >= STEP * COUNTDOWN.len() as u32 =>
            {
                let computer = self.picker.next();
                let (label, outcome) = match player {
                    Some(p) => (p.label.clone(), judge(p, computer)),
                    None    => (GestureLabel::Unknown, Outcome::Unreadable),
                };
                let round = Round { player: label, computer, outcome };
                self.phase = Phase::Showing { until: now + RESULT_HOLD };
                self.last = Some(round.clone());
                Some(round)
            }
            Phase::Showing { until } if now >= until => {
                self.phase = Phase::Idle;
                None
            }
            _ => None,
        }
    }

    /// Large text to draw over the camera view, if any.
    pub fn overlay(&self, now: Instant) -> Option<&'static str> {
        match self.phase {
            Phase::Idle => None,
            Phase::Countdown { started } => {
                let step = (now.saturating_duration_since(started).as_millis() / STEP.as_millis()) as usize;
                Some(COUNTDOWN[step.min(COUNTDOWN.len() - 1)])
            }
            Phase::Showing { until } if now < until => self.last.as_ref().map(|r| r.outcome.banner()),
            Phase::Showing { .. } => None,
        }
    }

    pub fn last_round(&self) -> Option<&Round> { self.last.as_ref() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
