//! # hand_pose
//!
//! Per-frame hand skeletons as produced by an external pose estimator:
//! 21 landmarks in normalized image space (x, y ∈ 0–1, z relative depth).
//!
//! * [`LandmarkFrame`] — exactly 21 points, validated on construction.
//! * [`normalize`] — translate the wrist to the origin and scale so the largest
//!   absolute coordinate is 1, giving a position/distance-invariant
//!   [`NormalizedVector`] of 63 components.
//! * [`FingerState`] — which of the five fingers are extended.
//! * [`synth`] — procedurally posed hands for simulation and tests.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_pose::{normalize, synth::{synth_hand, HandShape}};
//!
//! let near = synth_hand(HandShape::Rock, (0.3, 0.6), 0.25);
//! let far  = synth_hand(HandShape::Rock, (0.7, 0.4), 0.10);
//! assert!(normalize(&near).distance(&normalize(&far)) < 1e-9);
//! ```

pub mod error;
pub mod fingers;
pub mod landmark;
pub mod normalize;
pub mod synth;

pub use error::PoseError;
pub use fingers::FingerState;
pub use landmark::{Landmark, LandmarkFrame, LANDMARK_COUNT, COMPONENT_COUNT};
pub use normalize::{normalize, NormalizedVector};
