//! Static gesture classification against an [`ExemplarStore`].
//!
//! # Scoring
//!
//! Every gesture with at least one exemplar gets a score, lower is better:
//!
//! * [`MatchMode::TopK`]: mean of the `k` smallest Euclidean distances
//!   (all of them when the gesture has fewer than `k`).
//! * [`MatchMode::Nearest`]: the single smallest distance.
//!
//! Gestures with no exemplars are left out entirely.
//!
//! # Ambiguity rejection
//!
//! With two or more scored gestures, `best / second_best > ratio` means the
//! top two are too close to call and the result is [`GestureLabel::Unknown`]
//! carrying the best score.  Two zero scores count as a ratio of 1.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hand_pose::{normalize, LandmarkFrame, NormalizedVector};

use crate::exemplar::ExemplarStore;

// ════════════════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    TopK,
    /// Single nearest exemplar; the older, simpler matcher.
    Nearest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: MatchMode,
    /// Distances averaged per gesture in top-k mode.
    pub k: usize,
    pub ambiguity_ratio: f64,
    /// Force rejection on or off.  Unset: on for top-k, off for nearest.
    pub reject_ambiguous: Option<bool>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            mode:             MatchMode::TopK,
            k:                3,
            ambiguity_ratio:  0.85,
            reject_ambiguous: None,
        }
    }
}

impl ClassifierConfig {
    /// Nearest-neighbour scoring without rejection.
    pub fn nearest() -> Self {
        ClassifierConfig { mode: MatchMode::Nearest, ..ClassifierConfig::default() }
    }

    /// The ratio in effect, or `None` when rejection is off.
    pub fn rejection_ratio(&self) -> Option<f64> {
        let on = self.reject_ambiguous.unwrap_or(self.mode == MatchMode::TopK);
        on.then_some(self.ambiguity_ratio)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Results
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureLabel {
    Known(String),
    Unknown,
}

impl GestureLabel {
    pub fn as_str(&self) -> &str {
        match self {
            GestureLabel::Known(name) => name,
            GestureLabel::Unknown     => "Unknown",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus confidence score (a distance: 0 is a perfect match).
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    pub label: GestureLabel,
    pub score: f64,
}

impl ClassificationResult {
    pub fn unknown(score: f64) -> Self {
        ClassificationResult { label: GestureLabel::Unknown, score }
    }

    pub fn is_known(&self) -> bool { matches!(self.label, GestureLabel::Known(_)) }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.label, self.score)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureScore {
    pub gesture: String,
    pub score:   f64,
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig { &self.config }

    pub fn set_mode(&mut self, mode: MatchMode) { self.config.mode = mode; }

    /// Score of every gesture that has exemplars, best first.  Equal scores
    /// keep declaration order.
    pub fn scores(&self, vector: &NormalizedVector, store: &ExemplarStore) -> Vec<GestureScore> {
        let mut out: Vec<GestureScore> = store.iter()
            .filter(|(_, exemplars)| !exemplars.is_empty())
            .map(|(gesture, exemplars)| {
                let mut d: Vec<f64> = exemplars.iter()
                    .map(|e| vector.distance(e.vector()))
                    .collect();
                d.sort_by(f64::total_cmp);
                let score = match self.config.mode {
                    MatchMode::Nearest => d[0],
                    MatchMode::TopK => {
                        let k = self.config.k.clamp(1, d.len());
                        d[..k].iter().sum::<f64>() / k as f64
                    }
                };
                GestureScore { gesture: gesture.to_string(), score }
            })
            .collect();
        out.sort_by(|a, b| a.score.total_cmp(&b.score));
        out
    }

    pub fn classify_vector(&self, vector: &NormalizedVector, store: &ExemplarStore) -> ClassificationResult {
        let scores = self.scores(vector, store);
        let result = self.decide(&scores);
        debug!(result = %result, scored = scores.len(), "classified");
        result
    }

    /// Normalize `frame` and classify it.
    pub fn classify(&self, frame: &LandmarkFrame, store: &ExemplarStore) -> ClassificationResult {
        self.classify_vector(&normalize(frame), store)
    }

    /// Pick a label from an ascending score table.
    pub fn decide(&self, scores: &[GestureScore]) -> ClassificationResult {
        let Some(best) = scores.first() else {
            return ClassificationResult::unknown(0.0);
        };
        if let (Some(limit), Some(second)) = (self.config.rejection_ratio(), scores.get(1)) {
            let ratio = if second.score == 0.0 { 1.0 } else { best.score / second.score };
            if ratio > limit {
                debug!(best = %best.gesture, second = %second.gesture, ratio, "ambiguous");
                return ClassificationResult::unknown(best.score);
            }
        }
        ClassificationResult {
            label: GestureLabel::Known(best.gesture.clone()),
            score: best.score,
        }
    }
}

/// Classify with the default (top-3, 0.85 rejection) configuration.
///
/// The score is the mean of the three closest exemplar distances, so a frame
/// identical to one stored exemplar scores above zero unless the other two
/// coincide with it as well.  Only [`MatchMode::Nearest`] gives `0.0` there.
pub fn classify_gesture(frame: &LandmarkFrame, store: &ExemplarStore) -> ClassificationResult {
    Classifier::default().classify(frame, store)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::synth::{jittered, synth_hand, HandShape};
    use hand_pose::{Landmark, COMPONENT_COUNT};

    use crate::exemplar::append_exemplar;

    fn axis(i: usize, x: f64) -> NormalizedVector {
        let mut c = [0.0; COMPONENT_COUNT];
        c[i] = x;
        NormalizedVector::from_components(c)
    }

    fn rock_paper_store() -> (ExemplarStore, Vec<LandmarkFrame>) {
        let mut store = ExemplarStore::new(["rock", "paper"]);
        let mut rocks = Vec::new();
        for seed in 1..=3 {
            let r = jittered(&synth_hand(HandShape::Rock, (0.5, 0.5), 0.2), 0.004, seed).unwrap();
            let p = jittered(&synth_hand(HandShape::Paper, (0.5, 0.5), 0.2), 0.004, seed + 100).unwrap();
            append_exemplar(&mut store, "rock", &r);
            append_exemplar(&mut store, "paper", &p);
            rocks.push(r);
        }
        (store, rocks)
    }

    #[test]
    fn exact_exemplar_scores_zero() {
        let (store, rocks) = rock_paper_store();
        let res = Classifier::new(ClassifierConfig::nearest()).classify(&rocks[1], &store);
        assert_eq!(res.label, GestureLabel::Known("rock".into()));
        assert_eq!(res.score, 0.0);
    }

    #[test]
    fn exact_exemplar_wins_in_top_k() {
        let (store, rocks) = rock_paper_store();
        let scores = Classifier::default().scores(&normalize(&rocks[0]), &store);
        assert_eq!(scores[0].gesture, "rock");
        assert_eq!(classify_gesture(&rocks[0], &store).label.as_str(), "rock");
    }

    #[test]
    fn top_k_score_of_exact_exemplar_is_mean_of_three_closest() {
        let (store, rocks) = rock_paper_store();
        let v = normalize(&rocks[0]);
        let rock_exemplars = store.load("rock");
        assert_eq!(rock_exemplars.len(), 3);
        let expected = rock_exemplars.iter().map(|e| e.vector().distance(&v)).sum::<f64>() / 3.0;

        let res = classify_gesture(&rocks[0], &store);
        assert_eq!(res.label, GestureLabel::Known("rock".into()));
        assert!((res.score - expected).abs() < 1e-12, "{} vs {}", res.score, expected);
        assert!(res.score > 0.0);
    }

    #[test]
    fn moved_and_scaled_hand_still_matches() {
        let (store, _) = rock_paper_store();
        let far = synth_hand(HandShape::Paper, (0.8, 0.3), 0.07);
        assert_eq!(classify_gesture(&far, &store).label.as_str(), "paper");
    }

    #[test]
    fn midpoint_is_unknown() {
        // One exemplar each, the input equidistant from both.
        let mut store = ExemplarStore::new(["rock", "paper"]);
        store.append("rock", axis(3, 1.0));
        store.append("paper", axis(4, 1.0));
        let mid = {
            let mut c = [0.0; COMPONENT_COUNT];
            c[3] = 0.5;
            c[4] = 0.5;
            NormalizedVector::from_components(c)
        };
        let res = Classifier::default().classify_vector(&mid, &store);
        assert_eq!(res.label, GestureLabel::Unknown);
        assert!((res.score - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn midpoint_frame_is_unknown() {
        // Frames whose normalized vectors sit symmetrically around the input.
        let base: Vec<Landmark> = (0..21).map(|i| Landmark::new(i as f64 * 0.01, 0.0, 0.0)).collect();
        let mut a = base.clone();
        let mut b = base.clone();
        a[5].y = 0.02;
        b[5].y = -0.02;
        let mut store = ExemplarStore::new(["rock", "paper"]);
        append_exemplar(&mut store, "rock", &LandmarkFrame::from_landmarks(&a).unwrap());
        append_exemplar(&mut store, "paper", &LandmarkFrame::from_landmarks(&b).unwrap());
        let res = classify_gesture(&LandmarkFrame::from_landmarks(&base).unwrap(), &store);
        assert_eq!(res.label, GestureLabel::Unknown);
        assert!(res.score > 0.0);
    }

    #[test]
    fn ratio_at_threshold_is_known() {
        let cfg = ClassifierConfig { ambiguity_ratio: 0.75, ..ClassifierConfig::default() };
        let mut store = ExemplarStore::new(["a", "b"]);
        store.append("a", axis(0, 0.75));
        store.append("b", axis(0, -1.0));
        // Distances from zero: a = 0.75, b = 1.0, ratio exactly 0.75.
        let res = Classifier::new(cfg).classify_vector(&axis(0, 0.0), &store);
        assert_eq!(res, ClassificationResult { label: GestureLabel::Known("a".into()), score: 0.75 });
    }

    #[test]
    fn ratio_above_threshold_is_unknown() {
        let mut store = ExemplarStore::new(["a", "b"]);
        store.append("a", axis(0, 0.9));
        store.append("b", axis(0, -1.0));
        let res = Classifier::default().classify_vector(&axis(0, 0.0), &store);
        assert_eq!(res.label, GestureLabel::Unknown);
        assert!((res.score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn nearest_mode_does_not_reject_by_default() {
        let mut store = ExemplarStore::new(["a", "b"]);
        store.append("a", axis(0, 0.9));
        store.append("b", axis(0, -1.0));
        let res = Classifier::new(ClassifierConfig::nearest()).classify_vector(&axis(0, 0.0), &store);
        assert_eq!(res.label.as_str(), "a");
    }

    #[test]
    fn rejection_can_be_forced_on_for_nearest() {
        let cfg = ClassifierConfig { reject_ambiguous: Some(true), ..ClassifierConfig::nearest() };
        let mut store = ExemplarStore::new(["a", "b"]);
        store.append("a", axis(0, 0.9));
        store.append("b", axis(0, -1.0));
        assert!(!Classifier::new(cfg).classify_vector(&axis(0, 0.0), &store).is_known());
    }

    #[test]
    fn empty_store_is_unknown_zero() {
        let store = ExemplarStore::new(["rock", "paper", "scissors"]);
        let frame = synth_hand(HandShape::Rock, (0.5, 0.5), 0.2);
        assert_eq!(classify_gesture(&frame, &store), ClassificationResult::unknown(0.0));
    }

    #[test]
    fn single_scored_gesture_never_rejected() {
        let mut store = ExemplarStore::new(["rock", "paper"]);
        store.append("rock", axis(0, 1.0));
        let res = Classifier::default().classify_vector(&axis(1, 1.0), &store);
        assert_eq!(res.label.as_str(), "rock");
    }

    #[test]
    fn top_k_averages_three_best() {
        let mut store = ExemplarStore::new(["a"]);
        for x in [1.0, 2.0, 3.0, 10.0] {
            store.append("a", axis(0, x));
        }
        let scores = Classifier::default().scores(&axis(0, 0.0), &store);
        assert!((scores[0].score - 2.0).abs() < 1e-12);

        let nearest = Classifier::new(ClassifierConfig::nearest()).scores(&axis(0, 0.0), &store);
        assert!((nearest[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_k_uses_all() {
        let mut store = ExemplarStore::new(["a"]);
        store.append("a", axis(0, 1.0));
        store.append("a", axis(0, 3.0));
        let scores = Classifier::default().scores(&axis(0, 0.0), &store);
        assert!((scores[0].score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn scores_are_ascending_and_skip_empty() {
        let mut store = ExemplarStore::new(["far", "empty", "near"]);
        store.append("far", axis(0, 5.0));
        store.append("near", axis(0, 1.0));
        let names: Vec<_> = Classifier::default()
            .scores(&axis(0, 0.0), &store)
            .into_iter()
            .map(|s| s.gesture)
            .collect();
        assert_eq!(names, vec!["near", "far"]);
    }

    #[test]
    fn both_zero_scores_are_ambiguous() {
        let mut store = ExemplarStore::new(["a", "b"]);
        store.append("a", axis(0, 1.0));
        store.append("b", axis(0, 1.0));
        let res = Classifier::default().classify_vector(&axis(0, 1.0), &store);
        assert_eq!(res, ClassificationResult::unknown(0.0));
    }

    #[test]
    fn ties_resolve_to_first_declared_without_rejection() {
        let mut store = ExemplarStore::new(["b", "a"]);
        store.append("a", axis(0, 1.0));
        store.append("b", axis(0, -1.0));
        let res = Classifier::new(ClassifierConfig::nearest()).classify_vector(&axis(0, 0.0), &store);
        assert_eq!(res.label.as_str(), "b");
    }
}
