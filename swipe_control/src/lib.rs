//! # swipe_control
//!
//! Turns a per-frame fingertip position into debounced eight-way swipe
//! commands.
//!
//! ```text
//!   frame ─▶ SwipeSession ─┬─▶ TrailTracker  (5-point ring, displacement, bucketing)
//!                          └─▶ DebounceState (entry window, 1 s cooldown)
//!                                   │
//!                                   ▼
//!                   DirectionEvent ─▶ CommandTable (fingers × direction → Command)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use swipe_control::{SwipeSession, TrailPoint, TrackerConfig, DebounceConfig, Direction};
//!
//! let debounce = DebounceConfig { entry_ignore_frames: 0, ..DebounceConfig::default() };
//! let mut session = SwipeSession::new(TrackerConfig::default(), debounce);
//! let t0 = Instant::now();
//! let mut fired = None;
//! for i in 0..5 {
//!     let p = TrailPoint::new(100.0 + 25.0 * i as f64, 240.0);
//!     fired = session.step(Some(p), false, t0 + Duration::from_millis(33 * i)).fired;
//! }
//! assert_eq!(fired.map(|e| e.direction), Some(Direction::Right));
//! ```

pub mod command;
pub mod debounce;
pub mod direction;
pub mod session;
pub mod trail;

pub use command::{Binding, Command, CommandTable, FingerPattern};
pub use debounce::{step_debounce, DebounceConfig, DebounceState, HandPhase};
pub use direction::{Direction, DirectionEvent};
pub use session::{HandSlot, SwipeOutcome, SwipeSession};
pub use trail::{push_trail_point, TrackerConfig, Trail, TrailPoint, TrailReading, TrailTracker};
