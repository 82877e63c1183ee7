//! (finger pattern, direction) → command lookup.
//!
//! The table is plain configuration: an ordered list of bindings, first match
//! wins.  The defaults reproduce the media/app-switcher layout:
//!
//! | Fingers | Direction | Command |
//! |---|---|---|
//! | index up | Up | `volume_up` |
//! | index up | Down | `volume_down` |
//! | index up | Right | `next_track` |
//! | index up | Up-Right | `play` |
//! | index up | Down-Left | `pause` |
//! | all up | Right | `next_app` |
//! | all up | Left | `prev_app` |

use std::fmt;

use serde::{Deserialize, Serialize};

use hand_pose::FingerState;

use crate::direction::Direction;

// ════════════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    VolumeUp,
    VolumeDown,
    Play,
    Pause,
    NextTrack,
    NextApp,
    PrevApp,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::VolumeUp   => "volume_up",
            Command::VolumeDown => "volume_down",
            Command::Play       => "play",
            Command::Pause      => "pause",
            Command::NextTrack  => "next_track",
            Command::NextApp    => "next_app",
            Command::PrevApp    => "prev_app",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerPattern
// ════════════════════════════════════════════════════════════════════════════

/// Which finger states a binding applies to.
///
/// In TOML: `fingers = "index_up"`, or
/// `fingers = { exact = [false, true, true, false, false] }` (thumb first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerPattern {
    Any,
    /// Index extended, but not the whole hand.
    IndexUp,
    AllUp,
    Exact([bool; 5]),
}

impl FingerPattern {
    pub fn matches(&self, fingers: &FingerState) -> bool {
        match self {
            FingerPattern::Any        => true,
            FingerPattern::IndexUp    => fingers.index && !fingers.all_extended(),
            FingerPattern::AllUp      => fingers.all_extended(),
            FingerPattern::Exact(m)   => fingers.flags() == *m,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Binding / CommandTable
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub fingers:   FingerPattern,
    pub direction: Direction,
    pub command:   Command,
}

impl Binding {
    pub fn new(fingers: FingerPattern, direction: Direction, command: Command) -> Self {
        Binding { fingers, direction, command }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTable {
    bindings: Vec<Binding>,
}

impl CommandTable {
    pub fn new(bindings: Vec<Binding>) -> Self {
        CommandTable { bindings }
    }

    pub fn bindings(&self) -> &[Binding] { &self.bindings }

    /// First binding whose direction and finger pattern both match.
    pub fn lookup(&self, fingers: &FingerState, direction: Direction) -> Option<Command> {
        self.bindings.iter()
            .find(|b| b.direction == direction && b.fingers.matches(fingers))
            .map(|b| b.command)
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        use Command::*;
        use Direction as D;
        use FingerPattern::{AllUp, IndexUp};
        CommandTable::new(vec![
            Binding::new(IndexUp, D::Up,       VolumeUp),
            Binding::new(IndexUp, D::Down,     VolumeDown),
            Binding::new(IndexUp, D::Right,    NextTrack),
            Binding::new(IndexUp, D::UpRight,  Play),
            Binding::new(IndexUp, D::DownLeft, Pause),
            Binding::new(AllUp,   D::Right,    NextApp),
            Binding::new(AllUp,   D::Left,     PrevApp),
        ])
    }
}

impl From<Vec<Binding>> for CommandTable {
    fn from(bindings: Vec<Binding>) -> Self { CommandTable::new(bindings) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point()  -> FingerState { FingerState::from_flags([false, true, false, false, false]) }
    fn palm()   -> FingerState { FingerState::from_flags([true; 5]) }
    fn fist()   -> FingerState { FingerState::default() }

    #[test]
    fn default_media_bindings() {
        let t = CommandTable::default();
        assert_eq!(t.lookup(&point(), Direction::Up),       Some(Command::VolumeUp));
        assert_eq!(t.lookup(&point(), Direction::Down),     Some(Command::VolumeDown));
        assert_eq!(t.lookup(&point(), Direction::UpRight),  Some(Command::Play));
        assert_eq!(t.lookup(&point(), Direction::DownLeft), Some(Command::Pause));
    }

    #[test]
    fn same_direction_different_fingers() {
        let t = CommandTable::default();
        assert_eq!(t.lookup(&point(), Direction::Right), Some(Command::NextTrack));
        assert_eq!(t.lookup(&palm(),  Direction::Right), Some(Command::NextApp));
        assert_eq!(t.lookup(&fist(),  Direction::Right), None);
    }

    #[test]
    fn unbound_direction_is_none() {
        assert_eq!(CommandTable::default().lookup(&point(), Direction::UpLeft), None);
    }

    #[test]
    fn first_match_wins() {
        let t = CommandTable::new(vec![
            Binding::new(FingerPattern::Any,     Direction::Up, Command::Play),
            Binding::new(FingerPattern::IndexUp, Direction::Up, Command::VolumeUp),
        ]);
        assert_eq!(t.lookup(&point(), Direction::Up), Some(Command::Play));
    }

    #[test]
    fn exact_mask() {
        let peace = FingerState::from_flags([false, true, true, false, false]);
        let pat = FingerPattern::Exact([false, true, true, false, false]);
        assert!(pat.matches(&peace));
        assert!(!pat.matches(&point()));
        assert!(FingerPattern::IndexUp.matches(&peace));
        assert!(!FingerPattern::IndexUp.matches(&palm()));
    }
}
