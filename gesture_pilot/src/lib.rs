//! # gesture_pilot
//!
//! Hand-gesture media controller.  Each frame the primary hand's pose is
//! matched against recorded exemplars, and every hand's index fingertip is
//! tracked for eight-way swipes.  A swipe that survives the debouncer is
//! looked up against the raised fingers and turned into a media command,
//! published as MIDI.
//!
//! ## Default bindings
//!
//! | Fingers | Swipe | Command |
//! |---|---|---|
//! | Index only | Up | Volume up (5 steps) |
//! | Index only | Down | Volume down (5 steps) |
//! | Index only | Right | Next track |
//! | Index only | Up-right | Play |
//! | Index only | Down-left | Pause |
//! | All five | Right | Next app |
//! | All five | Left | Previous app |
//!
//! Bindings, thresholds and the app list can be overridden in
//! `gesture_pilot.toml` (see [`config`]).
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse moves a synthetic hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Key | Effect |
//! |---|---|
//! | mouse | Move the hand |
//! | `1`–`6` | Pose: rock, paper, scissors, point, phone, heart |
//! | `H` | Hide / show the hand |
//! | `B` | Add / remove a mirrored second hand |
//! | `C` then `1`–`6` | Capture the current hand as that gesture |
//! | `G` | Play rock-paper-scissors: count down, then throw |
//! | `Q` | Quit |

pub mod actions;
pub mod config;
pub mod source;
pub mod visualizer;
pub mod app;
