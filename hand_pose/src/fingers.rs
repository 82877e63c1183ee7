//! Per-frame finger extension state.
//!
//! A finger counts as extended when its tip sits above its PIP joint in the
//! image (smaller `y`).  The thumb is judged sideways instead: extended when
//! its tip is left of the IP joint, which holds for a right hand seen in a
//! mirrored (selfie) camera view.

use serde::{Deserialize, Serialize};

use crate::landmark::{
    LandmarkFrame,
    THUMB_IP, THUMB_TIP,
    INDEX_PIP, INDEX_TIP,
    MIDDLE_PIP, MIDDLE_TIP,
    RING_PIP, RING_TIP,
    PINKY_PIP, PINKY_TIP,
};

/// Which fingers are extended, thumb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerState {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerState {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        let up = |tip: usize, pip: usize| frame.point(tip).y < frame.point(pip).y;
        FingerState {
            thumb:  frame.point(THUMB_TIP).x < frame.point(THUMB_IP).x,
            index:  up(INDEX_TIP,  INDEX_PIP),
            middle: up(MIDDLE_TIP, MIDDLE_PIP),
            ring:   up(RING_TIP,   RING_PIP),
            pinky:  up(PINKY_TIP,  PINKY_PIP),
        }
    }

    pub fn from_flags(flags: [bool; 5]) -> Self {
        let [thumb, index, middle, ring, pinky] = flags;
        FingerState { thumb, index, middle, ring, pinky }
    }

    pub fn flags(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn extended_count(&self) -> usize {
        self.flags().iter().filter(|&&f| f).count()
    }

    /// All five fingers up: the open palm.
    pub fn all_extended(&self) -> bool {
        self.extended_count() == 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{synth_hand, HandShape};

    fn state(shape: HandShape) -> FingerState {
        FingerState::from_frame(&synth_hand(shape, (0.5, 0.5), 0.2))
    }

    #[test]
    fn open_palm_is_all_extended() {
        assert!(state(HandShape::Paper).all_extended());
    }

    #[test]
    fn fist_has_nothing_extended() {
        assert_eq!(state(HandShape::Rock).extended_count(), 0);
    }

    #[test]
    fn point_is_index_only() {
        assert_eq!(
            state(HandShape::Point),
            FingerState::from_flags([false, true, false, false, false])
        );
    }

    #[test]
    fn phone_is_thumb_and_pinky() {
        assert_eq!(
            state(HandShape::Phone),
            FingerState::from_flags([true, false, false, false, true])
        );
    }

    #[test]
    fn scissors_is_index_and_middle() {
        let s = state(HandShape::Scissors);
        assert!(s.index && s.middle);
        assert_eq!(s.extended_count(), 2);
    }
}
