//! Leave-one-out evaluation of a store against itself.

use std::collections::BTreeMap;

use crate::classifier::{Classifier, GestureLabel};
use crate::exemplar::ExemplarStore;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelfTest {
    pub total:   usize,
    pub correct: usize,
    /// `(expected, predicted)` → count, misses only.  Predicted is the label
    /// text, so rejections show up as `"Unknown"`.
    pub confusion: BTreeMap<(String, String), usize>,
}

impl SelfTest {
    /// Fraction correct, or `None` when nothing was tested.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

/// Classify every exemplar against the store minus that exemplar.
pub fn leave_one_out(classifier: &Classifier, store: &ExemplarStore) -> SelfTest {
    let mut report = SelfTest::default();
    for (gesture, exemplars) in store.iter() {
        for e in exemplars {
            let rest = store.without(gesture, e.id());
            let result = classifier.classify_vector(e.vector(), &rest);
            report.total += 1;
            if result.label == GestureLabel::Known(gesture.to_string()) {
                report.correct += 1;
            } else {
                *report.confusion
                    .entry((gesture.to_string(), result.label.as_str().to_string()))
                    .or_insert(0) += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;
    use crate::exemplar::append_exemplar;
    use hand_pose::synth::{jittered, synth_hand, HandShape};

    fn store(shapes: &[HandShape], per: u64) -> ExemplarStore {
        let mut s = ExemplarStore::new(shapes.iter().map(|h| h.name()));
        for &shape in shapes {
            for seed in 0..per {
                let f = jittered(&synth_hand(shape, (0.5, 0.5), 0.2), 0.003, seed * 7 + 1).unwrap();
                append_exemplar(&mut s, shape.name(), &f);
            }
        }
        s
    }

    #[test]
    fn distinct_shapes_score_perfectly() {
        let s = store(&[HandShape::Rock, HandShape::Paper], 4);
        let report = leave_one_out(&Classifier::new(ClassifierConfig::nearest()), &s);
        assert_eq!(report.total, 8);
        assert_eq!(report.correct, 8);
        assert!(report.confusion.is_empty());
        assert_eq!(report.accuracy(), Some(1.0));
    }

    #[test]
    fn lone_exemplar_is_a_miss() {
        // With its only exemplar held out, "paper" can never be predicted.
        let mut s = store(&[HandShape::Rock], 3);
        append_exemplar(&mut s, "paper", &synth_hand(HandShape::Paper, (0.5, 0.5), 0.2));
        let report = leave_one_out(&Classifier::new(ClassifierConfig::nearest()), &s);
        assert_eq!(report.total, 4);
        assert_eq!(report.correct, 3);
        assert_eq!(report.confusion.get(&("paper".into(), "rock".into())), Some(&1));
    }

    #[test]
    fn empty_store_has_no_accuracy() {
        let report = leave_one_out(&Classifier::default(), &ExemplarStore::new(["rock"]));
        assert_eq!(report.total, 0);
        assert_eq!(report.accuracy(), None);
    }
}
