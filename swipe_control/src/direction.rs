//! Eight-way compass directions and angle bucketing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A swipe direction in screen terms (up = toward the top of the image).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

/// Sector width in degrees.
const SECTOR_DEG: f64 = 45.0;

impl Direction {
    /// Counter-clockwise from Right, matching sector order.
    pub fn all() -> [Direction; 8] {
        [
            Direction::Right, Direction::UpRight, Direction::Up, Direction::UpLeft,
            Direction::Left, Direction::DownLeft, Direction::Down, Direction::DownRight,
        ]
    }

    /// Bucket an angle in degrees (0° = right, 90° = up, counter-clockwise)
    /// into one of eight 45° sectors centred on the compass directions.
    /// "Right" covers [337.5, 360) ∪ [0, 22.5).
    pub fn from_angle(degrees: f64) -> Direction {
        let a = degrees.rem_euclid(360.0);
        let sector = ((a + SECTOR_DEG / 2.0) / SECTOR_DEG).floor() as usize % 8;
        Direction::all()[sector]
    }

    /// Direction of a pixel displacement.  Image `y` grows downward, so the
    /// vertical component is flipped before taking the angle.
    pub fn from_displacement(dx: f64, dy: f64) -> Direction {
        Direction::from_angle(screen_angle(dx, dy))
    }

    /// Centre angle of this direction's sector.
    pub fn angle(self) -> f64 {
        match self {
            Direction::Right     => 0.0,
            Direction::UpRight   => 45.0,
            Direction::Up        => 90.0,
            Direction::UpLeft    => 135.0,
            Direction::Left      => 180.0,
            Direction::DownLeft  => 225.0,
            Direction::Down      => 270.0,
            Direction::DownRight => 315.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Right     => "Right",
            Direction::UpRight   => "Up-Right",
            Direction::Up        => "Up",
            Direction::UpLeft    => "Up-Left",
            Direction::Left      => "Left",
            Direction::DownLeft  => "Down-Left",
            Direction::Down      => "Down",
            Direction::DownRight => "Down-Right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `atan2(-dy, dx)` in degrees, normalized to [0, 360).
pub fn screen_angle(dx: f64, dy: f64) -> f64 {
    (-dy).atan2(dx).to_degrees().rem_euclid(360.0)
}

// ════════════════════════════════════════════════════════════════════════════
// DirectionEvent
// ════════════════════════════════════════════════════════════════════════════

/// A classified swipe together with the displacement (pixels) that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionEvent {
    pub direction: Direction,
    pub magnitude: f64,
}

impl fmt::Display for DirectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0} px)", self.direction, self.magnitude)
    }
}
