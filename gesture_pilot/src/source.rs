//! Frame sources: LeapMotion hardware and mouse/keyboard simulation.
//!
//! The public interface is [`SourceEvent`] delivered over an `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware or
//! the simulator.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use hand_pose::synth::{synth_hand, HandShape};
use hand_pose::LandmarkFrame;
use swipe_control::HandSlot;

/// Image size frames are reported in, matching a 640×480 camera.
pub const FRAME_SIZE: (usize, usize) = (640, 480);

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

/// All hands seen in one frame, with the image size their landmarks refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    pub hands: Vec<(HandSlot, LandmarkFrame)>,
    pub size:  (usize, usize),
}

impl HandFrame {
    pub fn empty(size: (usize, usize)) -> Self {
        HandFrame { hands: Vec::new(), size }
    }

    pub fn hand(&self, slot: HandSlot) -> Option<&LandmarkFrame> {
        self.hands.iter().find(|(s, _)| *s == slot).map(|(_, f)| f)
    }

    /// The hand that gets classified.
    pub fn primary(&self) -> Option<&(HandSlot, LandmarkFrame)> {
        self.hands.first()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Frame(HandFrame),
    /// Store the current primary hand as an exemplar of this gesture.
    Capture(String),
    /// Begin a rock-paper-scissors countdown.
    StartGame,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    spawn_into(source, tx);
    rx
}

/// Spawn a source that shares an existing channel.
pub fn spawn_into<S: FrameSource>(source: S, tx: Sender<SourceEvent>) {
    thread::spawn(move || Box::new(source).run(tx));
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer position, normalized to the camera view (0–1).  Sent once per
    /// rendered frame; each one produces a hand frame.
    Pointer { x: f64, y: f64 },
    Shape(HandShape),
    ToggleHand,
    /// Add or remove a second, mirrored hand.
    ToggleSecondHand,
    /// The next `Shape` captures instead of switching.
    ArmCapture,
    StartGame,
    Quit,
}

/// Translates [`SimInput`] into [`SourceEvent`]s, synthesizing a hand at the
/// pointer.  With `emit_frames` off only the keys pass through (used next to
/// a hardware source).
pub struct SimFrameSource {
    pub rx:          Receiver<SimInput>,
    pub emit_frames: bool,
    state:           SimState,
}

impl SimFrameSource {
    pub fn new(rx: Receiver<SimInput>, emit_frames: bool) -> Self {
        SimFrameSource { rx, emit_frames, state: SimState::default() }
    }
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let SimFrameSource { rx, emit_frames, mut state } = *self;
        for input in rx {
            let Some(event) = state.translate(input, emit_frames) else { continue };
            let quit = event == SourceEvent::Quit;
            if tx.send(event).is_err() || quit { return; }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimState {
    pub shape:   HandShape,
    pub present: bool,
    pub second:  bool,
    pub armed:   bool,
}

impl Default for SimState {
    fn default() -> Self {
        SimState { shape: HandShape::Point, present: true, second: false, armed: false }
    }
}

const SIM_HAND_SCALE: f64 = 0.2;

impl SimState {
    pub fn translate(&mut self, input: SimInput, emit_frames: bool) -> Option<SourceEvent> {
        match input {
            SimInput::Pointer { x, y } => emit_frames.then(|| SourceEvent::Frame(self.frame_at(x, y))),
            SimInput::Shape(shape) if self.armed => {
                self.armed = false;
                Some(SourceEvent::Capture(shape.name().to_string()))
            }
            SimInput::Shape(shape) => { self.shape = shape; None }
            SimInput::ToggleHand       => { self.present = !self.present; None }
            SimInput::ToggleSecondHand => { self.second = !self.second; None }
            SimInput::ArmCapture       => { self.armed = true; None }
            SimInput::StartGame        => Some(SourceEvent::StartGame),
            SimInput::Quit             => Some(SourceEvent::Quit),
        }
    }

    /// The right hand follows the pointer; the optional left hand mirrors it.
    fn frame_at(&self, x: f64, y: f64) -> HandFrame {
        let mut frame = HandFrame::empty(FRAME_SIZE);
        if !self.present {
            return frame;
        }
        frame.hands.push((HandSlot::Right, synth_hand(self.shape, (x, y), SIM_HAND_SCALE)));
        if self.second {
            frame.hands.push((HandSlot::Left, synth_hand(self.shape, (1.0 - x, y), SIM_HAND_SCALE)));
        }
        frame
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (mm, y up, origin on the device) are projected onto a
/// virtual camera looking down at the interaction box: x over ±200 mm, y over
/// 50–450 mm, both into 0–1 with image y growing downward.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;
        use tracing::error;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => { error!(error = ?e, "LeapC connection failed"); return; }
        };
        if let Err(e) = connection.open() {
            error!(error = ?e, "opening LeapMotion device failed");
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let mut out = HandFrame::empty(FRAME_SIZE);
                for hand in frame.hands() {
                    let slot = match hand.hand_type() {
                        HandType::Left  => HandSlot::Left,
                        HandType::Right => HandSlot::Right,
                    };
                    if let Some(landmarks) = leap_landmarks(&hand) {
                        out.hands.push((slot, landmarks));
                    }
                }
                if tx.send(SourceEvent::Frame(out)).is_err() { return; }
            }
        }
    }
}

/// 21 landmarks in hand-model order: wrist, then per digit (thumb first)
/// the joints from knuckle to tip.
#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand) -> Option<LandmarkFrame> {
    use hand_pose::Landmark;

    macro_rules! project {
        ($joint:expr) => {{
            let v = $joint;
            Landmark::new(
                (v.x as f64 + 200.0) / 400.0,
                1.0 - (v.y as f64 - 50.0) / 400.0,
                v.z as f64 / 400.0,
            )
        }};
    }

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 { return None; }

    let mut points = Vec::with_capacity(hand_pose::LANDMARK_COUNT);
    points.push(project!(digits[2].metacarpal().prev_joint()));
    for digit in &digits[..5] {
        points.push(project!(digit.proximal().prev_joint()));
        points.push(project!(digit.intermediate().prev_joint()));
        points.push(project!(digit.distal().prev_joint()));
        points.push(project!(digit.distal().next_joint()));
    }
    LandmarkFrame::from_landmarks(&points).ok()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::FingerState;

    #[test]
    fn pointer_produces_a_right_hand() {
        let mut s = SimState::default();
        let Some(SourceEvent::Frame(f)) = s.translate(SimInput::Pointer { x: 0.5, y: 0.5 }, true) else {
            panic!("expected a frame");
        };
        assert_eq!(f.size, FRAME_SIZE);
        assert_eq!(f.hands.len(), 1);
        assert_eq!(f.primary().map(|(slot, _)| *slot), Some(HandSlot::Right));
        assert!(f.hand(HandSlot::Left).is_none());
    }

    #[test]
    fn hidden_hand_gives_empty_frames() {
        let mut s = SimState::default();
        assert_eq!(s.translate(SimInput::ToggleHand, true), None);
        assert_eq!(
            s.translate(SimInput::Pointer { x: 0.2, y: 0.3 }, true),
            Some(SourceEvent::Frame(HandFrame::empty(FRAME_SIZE)))
        );
    }

    #[test]
    fn second_hand_is_mirrored() {
        let mut s = SimState::default();
        s.translate(SimInput::ToggleSecondHand, true);
        let Some(SourceEvent::Frame(f)) = s.translate(SimInput::Pointer { x: 0.25, y: 0.5 }, true) else {
            panic!("expected a frame");
        };
        let right = f.hand(HandSlot::Right).map(|h| h.wrist().x);
        let left  = f.hand(HandSlot::Left).map(|h| h.wrist().x);
        match (right, left) {
            (Some(r), Some(l)) => assert!((r + l - 1.0).abs() < 1e-9),
            _ => panic!("expected two hands"),
        }
    }

    #[test]
    fn shape_keys_switch_or_capture() {
        let mut s = SimState::default();
        assert_eq!(s.translate(SimInput::Shape(HandShape::Paper), true), None);
        let Some(SourceEvent::Frame(f)) = s.translate(SimInput::Pointer { x: 0.5, y: 0.5 }, true) else {
            panic!("expected a frame");
        };
        let fingers = f.primary().map(|(_, h)| FingerState::from_frame(h));
        assert_eq!(fingers.map(|fs| fs.all_extended()), Some(true));

        s.translate(SimInput::ArmCapture, true);
        assert_eq!(
            s.translate(SimInput::Shape(HandShape::Rock), true),
            Some(SourceEvent::Capture("rock".into()))
        );
        assert_eq!(s.shape, HandShape::Paper);
        assert!(!s.armed);
    }

    #[test]
    fn keys_only_mode() {
        let mut s = SimState::default();
        assert_eq!(s.translate(SimInput::Pointer { x: 0.5, y: 0.5 }, false), None);
        assert_eq!(s.translate(SimInput::StartGame, false), Some(SourceEvent::StartGame));
        assert_eq!(s.translate(SimInput::Quit, false), Some(SourceEvent::Quit));
    }

    #[test]
    fn source_thread_forwards_until_quit() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_frame_source(SimFrameSource::new(sim_rx, true));
        sim_tx.send(SimInput::Pointer { x: 0.5, y: 0.5 }).unwrap();
        sim_tx.send(SimInput::ArmCapture).unwrap();
        sim_tx.send(SimInput::Shape(HandShape::Heart)).unwrap();
        sim_tx.send(SimInput::Quit).unwrap();
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SourceEvent::Frame(_)));
        assert_eq!(events[1], SourceEvent::Capture("heart".into()));
        assert_eq!(events[2], SourceEvent::Quit);
    }
}
