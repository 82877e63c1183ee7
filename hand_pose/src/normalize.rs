//! Wrist-origin, unit-extent normalization.
//!
//! Two frames of the same hand shape taken at different places in the image,
//! or at different distances from the camera, normalize to (nearly) the same
//! vector.  This is the representation exemplars are stored and compared in.

use crate::landmark::{LandmarkFrame, COMPONENT_COUNT, WRIST};

/// 63 components: 21 wrist-relative landmarks scaled so that the largest
/// absolute coordinate is 1 (or all zero for a degenerate frame).
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedVector([f64; COMPONENT_COUNT]);

impl NormalizedVector {
    /// Wrap 63 values that are already normalized (e.g. loaded from an
    /// exemplar written by this crate).  No normalization is applied.
    pub fn from_components(values: [f64; COMPONENT_COUNT]) -> Self {
        NormalizedVector(values)
    }

    pub fn components(&self) -> &[f64; COMPONENT_COUNT] { &self.0 }

    /// Euclidean distance between two vectors.
    pub fn distance(&self, other: &NormalizedVector) -> f64 {
        self.0.iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Largest absolute component (1.0 for any non-degenerate normalized frame).
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

/// Normalize a frame: subtract the wrist from every landmark, then divide by
/// the maximum absolute coordinate.  When every point coincides with the wrist
/// the division is skipped and the zero vector is returned.
///
/// Normalization is idempotent: normalizing an already-normalized frame
/// leaves it unchanged.
pub fn normalize(frame: &LandmarkFrame) -> NormalizedVector {
    let origin = frame.point(WRIST);
    let mut out = frame.to_flat();
    for c in out.chunks_exact_mut(3) {
        c[0] -= origin.x;
        c[1] -= origin.y;
        c[2] -= origin.z;
    }

    let max_val = out.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max_val > 0.0 {
        for v in out.iter_mut() { *v /= max_val; }
    }
    NormalizedVector(out)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LANDMARK_COUNT};
    use crate::synth::{synth_hand, HandShape};

    const EPS: f64 = 1e-9;

    fn transformed(frame: &LandmarkFrame, scale: f64, dx: f64, dy: f64, dz: f64) -> LandmarkFrame {
        frame.map(|p| Landmark::new(p.x * scale + dx, p.y * scale + dy, p.z * scale + dz)).unwrap()
    }

    #[test]
    fn wrist_becomes_origin() {
        let v = normalize(&synth_hand(HandShape::Paper, (0.4, 0.5), 0.2));
        assert_eq!(&v.components()[0..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn max_abs_is_one() {
        let v = normalize(&synth_hand(HandShape::Scissors, (0.6, 0.3), 0.15));
        assert!((v.max_abs() - 1.0).abs() < EPS);
    }

    #[test]
    fn translation_and_scale_invariant() {
        for shape in HandShape::all() {
            let f = synth_hand(shape, (0.5, 0.5), 0.2);
            let base = normalize(&f);
            for &(s, dx, dy, dz) in &[
                (1.0, 0.3, -0.2, 0.0),
                (0.25, 0.0, 0.0, 0.1),
                (3.5, -1.0, 2.0, -0.4),
                (0.01, 0.5, 0.5, 0.5),
            ] {
                let moved = normalize(&transformed(&f, s, dx, dy, dz));
                assert!(base.distance(&moved) < 1e-9, "{:?} s={}", shape, s);
            }
        }
    }

    #[test]
    fn degenerate_frame_is_zero_not_nan() {
        let f = LandmarkFrame::from_landmarks(&[Landmark::new(0.3, 0.3, 0.0); LANDMARK_COUNT]).unwrap();
        let v = normalize(&f);
        assert!(v.is_zero());
        assert!(v.components().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn idempotent() {
        let f = synth_hand(HandShape::Phone, (0.2, 0.7), 0.3);
        let once = normalize(&f);
        let again = normalize(&LandmarkFrame::from_flat(once.components()).unwrap());
        assert!(once.distance(&again) < EPS);
    }

    #[test]
    fn distance_is_euclidean() {
        let mut a = [0.0; COMPONENT_COUNT];
        let mut b = [0.0; COMPONENT_COUNT];
        a[3] = 3.0;
        b[4] = 4.0;
        let d = NormalizedVector::from_components(a).distance(&NormalizedVector::from_components(b));
        assert!((d - 5.0).abs() < EPS);
    }
}
