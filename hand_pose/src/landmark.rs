//! Landmark and frame types.

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (MediaPipe hand model order)
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in one hand frame.
pub const LANDMARK_COUNT: usize = 21;

/// Number of scalar components in a flattened frame (21 × {x, y, z}).
pub const COMPONENT_COUNT: usize = LANDMARK_COUNT * 3;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Bones of the hand skeleton, for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint in normalized image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Landmark { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// Exactly [`LANDMARK_COUNT`] landmarks for one detected hand.
///
/// Construction is the only place the point count and finiteness are
/// checked; everything downstream may index freely.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Build from a slice of landmarks.  Anything but 21 points is rejected.
    pub fn from_landmarks(points: &[Landmark]) -> Result<Self, PoseError> {
        if points.len() != LANDMARK_COUNT {
            return Err(PoseError::InvalidInput {
                expected: LANDMARK_COUNT,
                found:    points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PoseError::NonFinite { index });
        }
        let mut arr = [Landmark::default(); LANDMARK_COUNT];
        arr.copy_from_slice(points);
        Ok(LandmarkFrame { points: arr })
    }

    /// Caller guarantees every coordinate is finite.
    pub(crate) fn from_array(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    /// Build from `[x, y, z]` triples, the shape pose estimators usually hand out.
    pub fn from_triples(triples: &[[f64; 3]]) -> Result<Self, PoseError> {
        let pts: Vec<Landmark> = triples.iter()
            .map(|&[x, y, z]| Landmark::new(x, y, z))
            .collect();
        Self::from_landmarks(&pts)
    }

    /// Build from 63 flat components `x0, y0, z0, x1, …`.
    pub fn from_flat(values: &[f64]) -> Result<Self, PoseError> {
        if values.len() != COMPONENT_COUNT {
            return Err(PoseError::InvalidInput {
                expected: COMPONENT_COUNT,
                found:    values.len(),
            });
        }
        let pts: Vec<Landmark> = values.chunks_exact(3)
            .map(|c| Landmark::new(c[0], c[1], c[2]))
            .collect();
        Self::from_landmarks(&pts)
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn point(&self, index: usize) -> Landmark { self.points[index] }

    pub fn wrist(&self) -> Landmark { self.points[WRIST] }

    pub fn index_tip(&self) -> Landmark { self.points[INDEX_TIP] }

    /// Flatten to `x0, y0, z0, x1, …` (the on-disk exemplar order).
    pub fn to_flat(&self) -> [f64; COMPONENT_COUNT] {
        let mut out = [0.0; COMPONENT_COUNT];
        for (i, p) in self.points.iter().enumerate() {
            out[i * 3]     = p.x;
            out[i * 3 + 1] = p.y;
            out[i * 3 + 2] = p.z;
        }
        out
    }

    /// Pixel position of landmark `index` in a `width × height` image,
    /// truncated to whole pixels.
    pub fn pixel(&self, index: usize, width: usize, height: usize) -> (i32, i32) {
        let p = self.points[index];
        ((p.x * width as f64) as i32, (p.y * height as f64) as i32)
    }

    /// Apply `f` to every landmark, producing a new frame.  The result is
    /// held to the same rule as any other frame: a non-finite coordinate is
    /// rejected.
    pub fn map(&self, mut f: impl FnMut(Landmark) -> Landmark) -> Result<LandmarkFrame, PoseError> {
        let mut points = self.points;
        for p in points.iter_mut() { *p = f(*p); }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PoseError::NonFinite { index });
        }
        Ok(LandmarkFrame { points })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
