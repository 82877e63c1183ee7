//! Top-level application state machine.
//!
//! `AppState` owns the exemplar [`Library`], the [`Classifier`], one
//! [`SwipeSession`] per hand slot, the [`CommandTable`], the media
//! [`ActionState`], the [`CommandSink`] and an [`RpsGame`].  It processes
//! [`SourceEvent`]s and exposes what the visualizer draws each frame.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use gesture_match::{ClassificationResult, Classifier, GestureScore, Library, RpsGame};
use hand_pose::normalize;
use swipe_control::{Command, CommandTable, DirectionEvent, HandSlot, SwipeSession};

use crate::actions::{open_midi_sink, Action, ActionState, CommandSink, NullSink};
use crate::config::PilotConfig;
use crate::source::{HandFrame, SimFrameSource, SimInput, SourceEvent, FRAME_SIZE};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// FiredCommand
// ════════════════════════════════════════════════════════════════════════════

/// A direction that passed the debouncer, and what came of it.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredCommand {
    pub slot:    HandSlot,
    pub event:   DirectionEvent,
    /// `None` when no binding matched the hand's fingers.
    pub command: Option<Command>,
    pub action:  Option<Action>,
}

impl FiredCommand {
    pub fn describe(&self) -> String {
        match &self.action {
            Some(a) => format!("{} {}  ->  {}", self.slot, self.event.direction, a),
            None    => format!("{} {}  ->  (unbound)", self.slot, self.event.direction),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── recognition ───────────────────────────────────────────────────────
    library:    Library,
    classifier: Classifier,
    sessions:   BTreeMap<HandSlot, SwipeSession>,

    // ── commands ──────────────────────────────────────────────────────────
    table:      CommandTable,
    actions:    ActionState,
    sink:       Box<dyn CommandSink>,

    // ── latest frame and what it produced ─────────────────────────────────
    frame:       HandFrame,
    label:       Option<ClassificationResult>,
    ranking:     Vec<GestureScore>,
    hand_status: BTreeMap<HandSlot, String>,
    last_fired:  Option<FiredCommand>,

    /// Gesture name to capture from the next frame that has a hand.
    pending_capture: Option<String>,

    game: RpsGame,

    pub status: String,
}

impl AppState {
    pub fn new(cfg: &PilotConfig, library: Library, sink: Box<dyn CommandSink>) -> Self {
        let sessions = HandSlot::all().into_iter()
            .map(|slot| (slot, SwipeSession::new(cfg.tracker.clone(), cfg.debounce.clone())))
            .collect();
        let hand_status = HandSlot::all().into_iter()
            .map(|slot| (slot, "No hand".to_string()))
            .collect();
        let status = format!(
            "Ready: {} exemplars, {}",
            library.store().len(), sink.describe()
        );

        AppState {
            library,
            classifier: Classifier::new(cfg.classifier.clone()),
            sessions,
            table:      cfg.command_table(),
            actions:    ActionState::new(cfg.apps.clone()),
            sink,
            frame:       HandFrame::empty(FRAME_SIZE),
            label:       None,
            ranking:     Vec::new(),
            hand_status,
            last_fired:  None,
            pending_capture: None,
            game:        RpsGame::new(clock_seed()),
            status,
        }
    }

    // ── process one SourceEvent ──────────────────────────────────────────

    pub fn handle_event(&mut self, event: SourceEvent, now: Instant) {
        match event {
            SourceEvent::Frame(frame)     => self.process_frame(frame, now),
            SourceEvent::Capture(gesture) => self.capture(&gesture),
            SourceEvent::StartGame        => self.start_game(now),
            SourceEvent::Quit             => { /* handled in run loop */ }
        }
    }

    /// Capture `gesture` from the next frame that contains a hand.
    pub fn arm_capture(&mut self, gesture: impl Into<String>) {
        let gesture = gesture.into();
        self.status = format!("Show \"{}\" to capture it", gesture);
        self.pending_capture = Some(gesture);
    }

    pub fn start_game(&mut self, now: Instant) {
        if self.game.start(now) {
            self.status = "Rock, paper, scissors…".to_string();
        }
    }

    fn process_frame(&mut self, frame: HandFrame, now: Instant) {
        // ── Static gesture on the primary hand ────────────────────────────
        match frame.primary() {
            Some((_, hand)) => {
                self.ranking = self.classifier.scores(&normalize(hand), self.library.store());
                self.label   = Some(self.classifier.decide(&self.ranking));
            }
            None => {
                self.ranking.clear();
                self.label = None;
            }
        }

        // ── Swipes, one session per slot ──────────────────────────────────
        for (slot, session) in self.sessions.iter_mut() {
            let outcome = session.step_frame(frame.hand(*slot), frame.size, now);
            self.hand_status.insert(*slot, outcome.describe());

            let Some(event) = outcome.fired else { continue };
            let fingers = outcome.fingers.unwrap_or_default();
            let command = self.table.lookup(&fingers, event.direction);
            let action  = command.map(|c| self.actions.apply(c));
            if let Some(a) = &action {
                self.sink.deliver(a);
            }
            debug!(slot = %slot, direction = %event.direction, ?command, "swipe fired");

            let fired = FiredCommand { slot: *slot, event, command, action };
            self.status = fired.describe();
            self.last_fired = Some(fired);
        }

        self.frame = frame;

        if let Some(round) = self.game.tick(now, self.label.as_ref()) {
            info!(player = %round.player, computer = %round.computer, outcome = ?round.outcome, "rps round");
            self.status = round.describe();
        }

        if self.pending_capture.is_some() && self.frame.primary().is_some() {
            if let Some(gesture) = self.pending_capture.take() {
                self.capture(&gesture);
            }
        }
    }

    /// Persist the current primary hand as an exemplar of `gesture`.
    pub fn capture(&mut self, gesture: &str) {
        let Some((_, hand)) = self.frame.primary() else {
            self.status = "No hand to capture".to_string();
            return;
        };
        match self.library.capture(gesture, hand) {
            Ok(e) => {
                self.status = format!("Captured {} #{}", e.gesture(), e.id());
                info!(gesture, id = e.id(), "capture");
            }
            Err(e) => {
                warn!(error = %e, "capture failed");
                self.status = format!("Capture failed: {}", e);
            }
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn frame(&self)       -> &HandFrame                    { &self.frame }
    pub fn label(&self)       -> Option<&ClassificationResult> { self.label.as_ref() }
    pub fn ranking(&self)     -> &[GestureScore]               { &self.ranking }
    pub fn last_fired(&self)  -> Option<&FiredCommand>         { self.last_fired.as_ref() }
    pub fn actions(&self)     -> &ActionState                  { &self.actions }
    pub fn library(&self)     -> &Library                      { &self.library }
    pub fn capture_pending(&self) -> Option<&str>              { self.pending_capture.as_deref() }
    pub fn game(&self)        -> &RpsGame                      { &self.game }

    pub fn session(&self, slot: HandSlot) -> Option<&SwipeSession> {
        self.sessions.get(&slot)
    }

    pub fn hand_status(&self, slot: HandSlot) -> &str {
        self.hand_status.get(&slot).map_or("No hand", String::as_str)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos() as u64)
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the exemplar library and the command sink, starts the frame source
/// (simulation by default, hardware with `--features leap`) and drives the
/// event/render loop at ~60 fps.
pub fn run(cfg: PilotConfig, capture: Option<String>) -> Result<()> {
    let library = Library::open(&cfg.landmarks_dir, cfg.gestures.iter().cloned())
        .with_context(|| format!("loading exemplars from {}", cfg.landmarks_dir.display()))?;

    let sink: Box<dyn CommandSink> = if cfg.midi.enabled {
        open_midi_sink(cfg.midi.port_hint.as_deref(), cfg.midi.channel)
    } else {
        Box::new(NullSink)
    };

    // ── Frame sources ─────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let (event_tx, events) = mpsc::channel::<SourceEvent>();

    #[cfg(not(feature = "leap"))]
    crate::source::spawn_into(SimFrameSource::new(sim_rx, true), event_tx);

    #[cfg(feature = "leap")]
    {
        // Keys still come from the window; hands come from the device.
        crate::source::spawn_into(SimFrameSource::new(sim_rx, false), event_tx.clone());
        crate::source::spawn_into(crate::source::LeapFrameSource, event_tx);
    }

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx).context("opening visualizer window")?;

    let mut app = AppState::new(&cfg, library, sink);
    if let Some(gesture) = capture {
        app.arm_capture(gesture);
    }

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        if !vis.poll_input() { break; }

        loop {
            match events.try_recv() {
                Ok(SourceEvent::Quit)           => return Ok(()),
                Ok(evt)                         => app.handle_event(evt, Instant::now()),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        vis.render(&app);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use gesture_match::GestureLabel;
    use hand_pose::synth::{synth_hand, HandShape};
    use swipe_control::Direction;

    const TICK: Duration = Duration::from_millis(33);

    fn scratch(name: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("gesture_pilot_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&p);
        p
    }

    fn make_app(dir: &PathBuf) -> AppState {
        let cfg = PilotConfig { landmarks_dir: dir.clone(), ..PilotConfig::default() };
        let library = Library::open(&cfg.landmarks_dir, cfg.gestures.iter().cloned()).unwrap();
        AppState::new(&cfg, library, Box::new(NullSink))
    }

    fn one_hand(shape: HandShape, x: f64, y: f64) -> SourceEvent {
        SourceEvent::Frame(HandFrame {
            hands: vec![(HandSlot::Right, synth_hand(shape, (x, y), 0.2))],
            size:  FRAME_SIZE,
        })
    }

    /// Hold still through the entry window, then move by `step` per frame.
    fn swipe(app: &mut AppState, shape: HandShape, step: (f64, f64), t0: Instant) -> Instant {
        let mut t = t0;
        let (mut x, mut y) = (0.5, 0.5);
        for _ in 0..11 {
            app.handle_event(one_hand(shape, x, y), t);
            t += TICK;
        }
        for _ in 0..6 {
            x += step.0;
            y += step.1;
            app.handle_event(one_hand(shape, x, y), t);
            t += TICK;
        }
        t
    }

    #[test]
    fn pointing_swipe_up_raises_volume() {
        let dir = scratch("volume");
        let mut app = make_app(&dir);
        swipe(&mut app, HandShape::Point, (0.0, -0.03), Instant::now());
        let fired = app.last_fired().cloned();
        assert_eq!(fired.as_ref().map(|f| f.event.direction), Some(Direction::Up));
        assert_eq!(fired.as_ref().and_then(|f| f.command), Some(Command::VolumeUp));
        assert_eq!(fired.and_then(|f| f.action), Some(Action::Volume { delta: 5 }));
    }

    #[test]
    fn open_palm_swipe_switches_app() {
        let dir = scratch("apps");
        let mut app = make_app(&dir);
        swipe(&mut app, HandShape::Paper, (0.03, 0.0), Instant::now());
        assert_eq!(
            app.last_fired().and_then(|f| f.action.clone()),
            Some(Action::SwitchApp { index: 1, name: "Spotify".into() })
        );
        assert_eq!(app.actions().current_app(), Some("Spotify"));
    }

    #[test]
    fn unbound_swipe_is_reported() {
        let dir = scratch("unbound");
        let mut app = make_app(&dir);
        swipe(&mut app, HandShape::Rock, (0.0, -0.03), Instant::now());
        let fired = app.last_fired().cloned();
        assert_eq!(fired.as_ref().map(|f| f.command), Some(None));
        assert!(app.status.contains("unbound"));
    }

    #[test]
    fn hands_do_not_share_sessions() {
        let dir = scratch("two_hands");
        let mut app = make_app(&dir);
        let mut t = Instant::now();
        let still = synth_hand(HandShape::Point, (0.2, 0.5), 0.2);
        // Right moves from its first tracked frame; both trails fill on i = 14.
        for i in 0..15 {
            let y = if i < 11 { 0.5 } else { 0.5 - 0.03 * (i - 10) as f64 };
            let frame = HandFrame {
                hands: vec![
                    (HandSlot::Right, synth_hand(HandShape::Point, (0.7, y), 0.2)),
                    (HandSlot::Left,  still.clone()),
                ],
                size: FRAME_SIZE,
            };
            app.handle_event(SourceEvent::Frame(frame), t);
            t += TICK;
        }
        assert_eq!(app.last_fired().map(|f| f.slot), Some(HandSlot::Right));
        assert_eq!(app.hand_status(HandSlot::Left), "Idle: hand stationary");
        let left_trail = app.session(HandSlot::Left).map(|s| s.tracker().trail().len());
        assert_eq!(left_trail, Some(0));
    }

    #[test]
    fn absent_slot_reports_no_hand() {
        let dir = scratch("absent");
        let mut app = make_app(&dir);
        app.handle_event(one_hand(HandShape::Point, 0.5, 0.5), Instant::now());
        assert_eq!(app.hand_status(HandSlot::Left), "No hand");
        assert!(app.hand_status(HandSlot::Right).starts_with("Ignoring hand"));
    }

    #[test]
    fn capture_then_classify() {
        let dir = scratch("capture");
        let mut app = make_app(&dir);
        let t = Instant::now();

        app.handle_event(SourceEvent::Capture("rock".into()), t);
        assert_eq!(app.status, "No hand to capture");

        app.handle_event(one_hand(HandShape::Rock, 0.4, 0.4), t);
        assert!(app.label().is_some_and(|l| !l.is_known()));
        app.handle_event(SourceEvent::Capture("rock".into()), t);
        assert_eq!(app.status, "Captured rock #1");
        assert!(dir.join("rock_landmarks1.npy").exists());

        app.handle_event(one_hand(HandShape::Rock, 0.6, 0.5), t + TICK);
        assert_eq!(app.label().map(|l| l.label.clone()), Some(GestureLabel::Known("rock".into())));
        assert_eq!(app.ranking().len(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn armed_capture_waits_for_a_hand() {
        let dir = scratch("armed");
        let mut app = make_app(&dir);
        let t = Instant::now();
        app.arm_capture("heart");
        app.handle_event(SourceEvent::Frame(HandFrame::empty(FRAME_SIZE)), t);
        assert_eq!(app.capture_pending(), Some("heart"));
        app.handle_event(one_hand(HandShape::Heart, 0.5, 0.5), t + TICK);
        assert_eq!(app.capture_pending(), None);
        assert_eq!(app.library().store().load("heart").len(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn game_judges_the_hand_shown_after_the_countdown() {
        use gesture_match::rps::{judge, Throw};

        let dir = scratch("game");
        let mut app = make_app(&dir);
        let t = Instant::now();
        app.handle_event(one_hand(HandShape::Rock, 0.5, 0.5), t);
        app.handle_event(SourceEvent::Capture("rock".into()), t);

        app.handle_event(SourceEvent::StartGame, t);
        assert!(app.game().is_counting());
        assert_eq!(app.game().overlay(t), Some("1"));

        for s in 1..4 {
            app.handle_event(one_hand(HandShape::Rock, 0.5, 0.5), t + Duration::from_secs(s));
            assert!(app.game().last_round().is_none());
        }
        app.handle_event(one_hand(HandShape::Rock, 0.5, 0.5), t + Duration::from_secs(4));

        let round = app.game().last_round().cloned().unwrap();
        assert_eq!(round.player, GestureLabel::Known("rock".into()));
        let rock = app.label().cloned().unwrap();
        assert_eq!(round.outcome, judge(&rock, round.computer));
        assert!(Throw::all().contains(&round.computer));
        assert_eq!(app.status, round.describe());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn game_without_a_hand_is_unreadable() {
        let dir = scratch("game_empty");
        let mut app = make_app(&dir);
        let t = Instant::now();
        app.handle_event(SourceEvent::StartGame, t);
        app.handle_event(SourceEvent::Frame(HandFrame::empty(FRAME_SIZE)), t + Duration::from_secs(4));
        assert!(app.status.starts_with("COULDN'T READ HAND"));
        assert_eq!(app.game().overlay(t + Duration::from_secs(5)), Some("COULDN'T READ HAND"));
    }

    #[test]
    fn losing_the_hand_clears_the_label() {
        let dir = scratch("lose");
        let mut app = make_app(&dir);
        let t = Instant::now();
        app.handle_event(one_hand(HandShape::Rock, 0.5, 0.5), t);
        assert!(app.label().is_some());
        app.handle_event(SourceEvent::Frame(HandFrame::empty(FRAME_SIZE)), t + TICK);
        assert!(app.label().is_none());
        assert!(app.ranking().is_empty());
    }
}
