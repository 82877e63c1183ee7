//! Procedurally posed hands.
//!
//! Used by the keyboard/mouse simulation front end in place of a camera, and
//! by tests that need realistic, distinguishable shapes.  The hand is built
//! upright in a local frame (`u` right, `v` up, units of hand length) and then
//! placed in image space, where `y` grows downward.

use crate::error::PoseError;
use crate::landmark::{Landmark, LandmarkFrame, LANDMARK_COUNT, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// HandShape
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandShape {
    Rock,
    Paper,
    Scissors,
    Point,
    Phone,
    Heart,
}

impl HandShape {
    pub fn all() -> [HandShape; 6] {
        [
            HandShape::Rock, HandShape::Paper, HandShape::Scissors,
            HandShape::Point, HandShape::Phone, HandShape::Heart,
        ]
    }

    /// Gesture name used for exemplar files.
    pub fn name(self) -> &'static str {
        match self {
            HandShape::Rock     => "rock",
            HandShape::Paper    => "paper",
            HandShape::Scissors => "scissors",
            HandShape::Point    => "point",
            HandShape::Phone    => "phone",
            HandShape::Heart    => "heart",
        }
    }

    pub fn from_name(name: &str) -> Option<HandShape> {
        HandShape::all().into_iter().find(|s| s.name() == name)
    }

    fn poses(self) -> [Pose; 5] {
        use Pose::*;
        match self {
            //                      thumb     index     middle    ring      pinky
            HandShape::Rock     => [Curled,   Curled,   Curled,   Curled,   Curled],
            HandShape::Paper    => [Extended, Extended, Extended, Extended, Extended],
            HandShape::Scissors => [Curled,   Spread(-9.0), Spread(9.0), Curled, Curled],
            HandShape::Point    => [Curled,   Extended, Curled,   Curled,   Curled],
            HandShape::Phone    => [Extended, Curled,   Curled,   Curled,   Extended],
            HandShape::Heart    => [Spread(35.0), Hooked, Curled, Curled,   Curled],
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger geometry
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
enum Pose {
    Extended,
    /// Extended, rotated by the given number of degrees.
    Spread(f64),
    Curled,
    /// Bent sideways toward the thumb.
    Hooked,
}

struct FingerSpec {
    base:    (f64, f64),
    /// Degrees from straight up, positive toward +u.
    angle:   f64,
    lengths: [f64; 3],
    thumb:   bool,
}

const WRIST_LOCAL: (f64, f64) = (0.0, -0.35);

const FINGERS: [FingerSpec; 5] = [
    FingerSpec { base: (-0.15, -0.20), angle: -55.0, lengths: [0.20, 0.17, 0.14], thumb: true  },
    FingerSpec { base: (-0.17,  0.28), angle:  -8.0, lengths: [0.22, 0.13, 0.11], thumb: false },
    FingerSpec { base: (-0.05,  0.30), angle:   0.0, lengths: [0.25, 0.15, 0.12], thumb: false },
    FingerSpec { base: ( 0.07,  0.28), angle:   6.0, lengths: [0.22, 0.14, 0.11], thumb: false },
    FingerSpec { base: ( 0.18,  0.24), angle:  14.0, lengths: [0.17, 0.10, 0.09], thumb: false },
];

impl FingerSpec {
    /// Absolute segment angles for a pose.
    fn segment_angles(&self, pose: Pose) -> [f64; 3] {
        let a = self.angle;
        match (pose, self.thumb) {
            (Pose::Extended, _)      => [a, a, a],
            (Pose::Spread(d), _)     => [a + d, a + d, a + d],
            (Pose::Curled, true)     => [a, a + 90.0, a + 110.0],
            (Pose::Curled, false)    => [a + 10.0, a + 150.0, a + 200.0],
            (Pose::Hooked, _)        => [a, a - 80.0, a - 140.0],
        }
    }

    /// Four local points: base plus the end of each segment.
    fn joints(&self, pose: Pose) -> [(f64, f64, f64); 4] {
        let curled = matches!(pose, Pose::Curled | Pose::Hooked);
        let mut out = [(self.base.0, self.base.1, 0.0); 4];
        let (mut u, mut v, mut z) = out[0];
        for (k, (&deg, &len)) in self.segment_angles(pose).iter().zip(self.lengths.iter()).enumerate() {
            let r = deg.to_radians();
            u += r.sin() * len;
            v += r.cos() * len;
            z += if curled { -0.08 } else { -0.02 };
            out[k + 1] = (u, v, z);
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Public constructors
// ════════════════════════════════════════════════════════════════════════════

/// Build a hand of `shape` whose palm centre sits at `center` (normalized
/// image coordinates) and whose wrist-to-fingertip size is about `scale`.
///
/// A non-finite centre component falls back to `0.5` and a non-finite scale
/// to `0.2`, so the frame is always finite.
pub fn synth_hand(shape: HandShape, center: (f64, f64), scale: f64) -> LandmarkFrame {
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let center = (finite_or(center.0, 0.5), finite_or(center.1, 0.5));
    let scale = finite_or(scale, 0.2);

    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    let place = |(u, v, z): (f64, f64, f64)| {
        Landmark::new(center.0 + u * scale, center.1 - v * scale, z * scale)
    };

    pts[WRIST] = place((WRIST_LOCAL.0, WRIST_LOCAL.1, 0.0));
    for (f, (spec, pose)) in FINGERS.iter().zip(shape.poses()).enumerate() {
        for (j, p) in spec.joints(pose).into_iter().enumerate() {
            pts[1 + f * 4 + j] = place(p);
        }
    }

    LandmarkFrame::from_array(pts)
}

/// Deterministically perturb every landmark by up to `amplitude` on each axis.
/// Different `seed`s give different, reproducible perturbations.  A
/// non-finite `amplitude` is rejected like any other non-finite frame.
pub fn jittered(frame: &LandmarkFrame, amplitude: f64, seed: u64) -> Result<LandmarkFrame, PoseError> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut next = move || {
        // xorshift64*
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        let r = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
        (r >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    };
    frame.map(|p| Landmark::new(
        p.x + next() * amplitude,
        p.y + next() * amplitude,
        p.z + next() * amplitude,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{INDEX_TIP, WRIST};
    use crate::normalize::normalize;

    #[test]
    fn names_round_trip() {
        for s in HandShape::all() {
            assert_eq!(HandShape::from_name(s.name()), Some(s));
        }
        assert_eq!(HandShape::from_name("ok"), None);
    }

    #[test]
    fn hand_is_upright_in_image_space() {
        let f = synth_hand(HandShape::Point, (0.5, 0.5), 0.2);
        // Index tip above the wrist: smaller y.
        assert!(f.point(INDEX_TIP).y < f.point(WRIST).y);
    }

    #[test]
    fn shapes_are_pairwise_distinct() {
        let vs: Vec<_> = HandShape::all().iter()
            .map(|&s| normalize(&synth_hand(s, (0.5, 0.5), 0.2)))
            .collect();
        for i in 0..vs.len() {
            for j in (i + 1)..vs.len() {
                assert!(vs[i].distance(&vs[j]) > 0.1, "{} vs {}", i, j);
            }
        }
    }

    #[test]
    fn jitter_is_bounded_and_reproducible() {
        let f = synth_hand(HandShape::Rock, (0.5, 0.5), 0.2);
        let a = jittered(&f, 0.01, 7).unwrap();
        let b = jittered(&f, 0.01, 7).unwrap();
        let c = jittered(&f, 0.01, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        for (p, q) in f.points().iter().zip(a.points()) {
            assert!((p.x - q.x).abs() <= 0.01 + 1e-12);
            assert!((p.y - q.y).abs() <= 0.01 + 1e-12);
        }
    }

    #[test]
    fn non_finite_placement_falls_back_to_defaults() {
        let expected = synth_hand(HandShape::Paper, (0.5, 0.5), 0.2);
        assert_eq!(synth_hand(HandShape::Paper, (f64::NAN, 0.5), 0.2), expected);
        assert_eq!(synth_hand(HandShape::Paper, (0.5, f64::INFINITY), f64::NAN), expected);
        let f = synth_hand(HandShape::Rock, (f64::NEG_INFINITY, f64::NAN), f64::INFINITY);
        assert!(f.points().iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()));
    }

    #[test]
    fn jitter_rejects_non_finite_amplitude() {
        let f = synth_hand(HandShape::Rock, (0.5, 0.5), 0.2);
        assert_eq!(jittered(&f, f64::NAN, 1), Err(PoseError::NonFinite { index: 0 }));
        assert!(jittered(&f, f64::INFINITY, 1).is_err());
    }
}
