//! # gesture_match
//!
//! Static hand-pose recognition by comparison with stored exemplars.
//!
//! * [`ExemplarStore`]: normalized reference vectors grouped by gesture name.
//! * [`Library`]: the store plus its on-disk directory of `.npy` files
//!   (`{gesture}_landmarks{n}.npy`), loaded at start-up and appended on capture.
//! * [`Classifier`]: top-k averaged (or nearest) Euclidean distance per
//!   gesture, with ratio-based rejection of ambiguous matches.
//! * [`leave_one_out`]: how well a store classifies its own exemplars.
//! * [`rps`]: a rock-paper-scissors round judged from a classified hand.
//!
//! ## Example
//!
//! ```rust
//! use gesture_match::{append_exemplar, classify_gesture, ExemplarStore, GestureLabel};
//! use hand_pose::synth::{synth_hand, HandShape};
//!
//! let mut store = ExemplarStore::new(["rock", "paper"]);
//! append_exemplar(&mut store, "rock",  &synth_hand(HandShape::Rock,  (0.5, 0.5), 0.2));
//! append_exemplar(&mut store, "paper", &synth_hand(HandShape::Paper, (0.5, 0.5), 0.2));
//!
//! let seen = synth_hand(HandShape::Rock, (0.2, 0.7), 0.1);
//! let result = classify_gesture(&seen, &store);
//! assert_eq!(result.label, GestureLabel::Known("rock".into()));
//! ```

pub mod classifier;
pub mod evaluate;
pub mod exemplar;
pub mod library;
pub mod npy;
pub mod rps;

pub use classifier::{
    classify_gesture, ClassificationResult, Classifier, ClassifierConfig, GestureLabel,
    GestureScore, MatchMode,
};
pub use evaluate::{leave_one_out, SelfTest};
pub use exemplar::{append_exemplar, Exemplar, ExemplarId, ExemplarStore};
pub use library::{ExemplarDir, FileMatch, Library, Scan, StoreError};
pub use npy::CodecError;
pub use rps::{judge, Outcome, Round, RpsGame, Throw, ThrowPicker};
