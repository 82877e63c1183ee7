//! Commands → actions → MIDI.
//!
//! [`ActionState`] holds the little bit of media state the commands need
//! (is something playing, which app is in front) and turns each
//! [`Command`] into an [`Action`].  Actions go to a [`CommandSink`]; the MIDI
//! sink publishes them on a single channel so any MIDI-mappable host can
//! react:
//!
//! | Action | Message |
//! |---|---|
//! | `Volume { delta }` | CC 7, running level 0–127 |
//! | `PlayPause { playing }` | CC 80, 127 = playing, 0 = paused |
//! | `NextTrack` | CC 81, 127 |
//! | `SwitchApp { index, .. }` | program change `index` |

use std::fmt;

use tracing::{debug, info, warn};

use swipe_control::Command;

/// Key presses per volume command.
pub const VOLUME_PRESSES: i32 = 5;

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Volume change in key-press steps.
    Volume { delta: i32 },
    /// Playback toggled; `playing` is the new state.
    PlayPause { playing: bool },
    NextTrack,
    SwitchApp { index: usize, name: String },
    /// Nothing to do, with the reason shown to the user.
    Noop(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Volume { delta } if *delta >= 0 => write!(f, "Volume +{}", delta),
            Action::Volume { delta }              => write!(f, "Volume {}", delta),
            Action::PlayPause { playing: true }   => f.write_str("Playing"),
            Action::PlayPause { playing: false }  => f.write_str("Paused"),
            Action::NextTrack                     => f.write_str("Next track"),
            Action::SwitchApp { name, .. }        => write!(f, "Switch to {}", name),
            Action::Noop(reason)                  => f.write_str(reason),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ActionState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionState {
    media_playing: bool,
    current_app:   usize,
    apps:          Vec<String>,
}

impl ActionState {
    /// Nothing playing, first app in front.
    pub fn new(apps: Vec<String>) -> Self {
        ActionState { media_playing: false, current_app: 0, apps }
    }

    pub fn media_playing(&self) -> bool { self.media_playing }

    pub fn current_app(&self) -> Option<&str> {
        self.apps.get(self.current_app).map(String::as_str)
    }

    pub fn apply(&mut self, command: Command) -> Action {
        match command {
            Command::VolumeUp   => Action::Volume { delta:  VOLUME_PRESSES },
            Command::VolumeDown => Action::Volume { delta: -VOLUME_PRESSES },
            Command::Play if self.media_playing  => Action::Noop("Already playing".into()),
            Command::Pause if !self.media_playing => Action::Noop("Already paused".into()),
            Command::Play | Command::Pause => {
                self.media_playing = !self.media_playing;
                Action::PlayPause { playing: self.media_playing }
            }
            Command::NextTrack => Action::NextTrack,
            Command::NextApp   => self.switch(1),
            Command::PrevApp   => self.switch(-1),
        }
    }

    fn switch(&mut self, step: isize) -> Action {
        let n = self.apps.len();
        if n == 0 {
            return Action::Noop("No apps configured".into());
        }
        self.current_app = (self.current_app as isize + step).rem_euclid(n as isize) as usize;
        Action::SwitchApp { index: self.current_app, name: self.apps[self.current_app].clone() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommandSink — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

pub trait CommandSink: Send {
    fn deliver(&mut self, action: &Action);
    /// Shown in the status bar.
    fn describe(&self) -> String;
}

/// Raw MIDI byte output.  Implemented by the midir connection; tests use a
/// `Vec` of messages.
pub trait MidiWire: Send {
    fn send(&mut self, message: &[u8]);
}

impl MidiWire for midir::MidiOutputConnection {
    fn send(&mut self, message: &[u8]) {
        if let Err(e) = midir::MidiOutputConnection::send(self, message) {
            warn!(error = %e, "MIDI send failed");
        }
    }
}

impl MidiWire for Vec<Vec<u8>> {
    fn send(&mut self, message: &[u8]) { self.push(message.to_vec()); }
}

// ── MIDI sink ─────────────────────────────────────────────────────────────

const CC_VOLUME:     u8 = 7;
const CC_PLAY_PAUSE: u8 = 80;
const CC_NEXT_TRACK: u8 = 81;
const VOLUME_START:  i32 = 64;
const VOLUME_STEP:   i32 = 3;

pub struct MidiSink<W: MidiWire> {
    wire:    W,
    channel: u8,
    volume:  i32,
    port:    String,
}

impl<W: MidiWire> MidiSink<W> {
    pub fn new(wire: W, channel: u8, port: impl Into<String>) -> Self {
        MidiSink { wire, channel: channel & 0x0F, volume: VOLUME_START, port: port.into() }
    }

    pub fn wire(&self) -> &W { &self.wire }

    /// Current CC 7 level.
    pub fn volume(&self) -> u8 { self.volume as u8 }

    fn control_change(&mut self, controller: u8, value: u8) {
        self.wire.send(&[0xB0 | self.channel, controller, value & 0x7F]);
    }

    fn program_change(&mut self, program: u8) {
        self.wire.send(&[0xC0 | self.channel, program & 0x7F]);
    }
}

impl<W: MidiWire> CommandSink for MidiSink<W> {
    fn deliver(&mut self, action: &Action) {
        match action {
            Action::Volume { delta } => {
                self.volume = (self.volume + delta * VOLUME_STEP).clamp(0, 127);
                let level = self.volume as u8;
                self.control_change(CC_VOLUME, level);
            }
            Action::PlayPause { playing } => {
                self.control_change(CC_PLAY_PAUSE, if *playing { 127 } else { 0 });
            }
            Action::NextTrack => self.control_change(CC_NEXT_TRACK, 127),
            Action::SwitchApp { index, .. } => {
                self.program_change((*index).min(127) as u8);
            }
            Action::Noop(reason) => {
                debug!(reason = %reason, "nothing to send");
                return;
            }
        }
        info!(action = %action, port = %self.port, "sent");
    }

    fn describe(&self) -> String {
        format!("MIDI: {} ch {}", self.port, self.channel + 1)
    }
}

// ── null sink (used when no MIDI port is available) ───────────────────────

#[derive(Debug, Default)]
pub struct NullSink;

impl CommandSink for NullSink {
    fn deliver(&mut self, action: &Action) {
        info!(action = %action, "no MIDI output");
    }

    fn describe(&self) -> String { "MIDI: off".to_string() }
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_sink — enumerate ports and pick one
// ════════════════════════════════════════════════════════════════════════════

/// Open the first output port whose name contains `port_hint`
/// (case-insensitive), or the first port when no hint is given.  Falls back
/// to [`NullSink`] with a warning if nothing suitable is found.
pub fn open_midi_sink(port_hint: Option<&str>, channel: u8) -> Box<dyn CommandSink> {
    let midi_out = match midir::MidiOutput::new("gesture_pilot") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, using null output");
            return Box::new(NullSink);
        }
    };

    let ports = midi_out.ports();
    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let Some(idx) = pick_port(&names, port_hint) else {
        warn!(hint = ?port_hint, available = ?names, "no matching MIDI output port, using null output");
        return Box::new(NullSink);
    };

    let name = names[idx].clone();
    info!(port = %name, channel, "opening MIDI port");
    match midi_out.connect(&ports[idx], "gesture-pilot") {
        Ok(conn) => Box::new(MidiSink::new(conn, channel, name)),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed, using null output");
            Box::new(NullSink)
        }
    }
}

fn pick_port(names: &[String], hint: Option<&str>) -> Option<usize> {
    match hint {
        None => (!names.is_empty()).then_some(0),
        Some(h) => {
            let h = h.to_lowercase();
            names.iter().position(|n| n.to_lowercase().contains(&h))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ActionState {
        ActionState::new(vec!["Edge".into(), "Spotify".into(), "Discord".into()])
    }

    #[test]
    fn play_only_when_paused() {
        let mut s = state();
        assert_eq!(s.apply(Command::Pause), Action::Noop("Already paused".into()));
        assert_eq!(s.apply(Command::Play),  Action::PlayPause { playing: true });
        assert_eq!(s.apply(Command::Play),  Action::Noop("Already playing".into()));
        assert!(s.media_playing());
        assert_eq!(s.apply(Command::Pause), Action::PlayPause { playing: false });
        assert!(!s.media_playing());
    }

    #[test]
    fn apps_cycle_both_ways() {
        let mut s = state();
        assert_eq!(s.current_app(), Some("Edge"));
        assert_eq!(s.apply(Command::PrevApp), Action::SwitchApp { index: 2, name: "Discord".into() });
        assert_eq!(s.apply(Command::NextApp), Action::SwitchApp { index: 0, name: "Edge".into() });
        s.apply(Command::NextApp);
        s.apply(Command::NextApp);
        assert_eq!(s.apply(Command::NextApp), Action::SwitchApp { index: 0, name: "Edge".into() });
    }

    #[test]
    fn no_apps_is_noop() {
        let mut s = ActionState::new(Vec::new());
        assert!(matches!(s.apply(Command::NextApp), Action::Noop(_)));
        assert_eq!(s.current_app(), None);
    }

    #[test]
    fn volume_is_five_presses() {
        let mut s = state();
        assert_eq!(s.apply(Command::VolumeUp),   Action::Volume { delta: 5 });
        assert_eq!(s.apply(Command::VolumeDown), Action::Volume { delta: -5 });
    }

    #[test]
    fn midi_messages() {
        let mut sink = MidiSink::new(Vec::new(), 2, "test");
        sink.deliver(&Action::Volume { delta: 5 });
        sink.deliver(&Action::PlayPause { playing: true });
        sink.deliver(&Action::NextTrack);
        sink.deliver(&Action::SwitchApp { index: 1, name: "Spotify".into() });
        sink.deliver(&Action::Noop("Already playing".into()));
        assert_eq!(sink.wire(), &vec![
            vec![0xB2, 7, 79],
            vec![0xB2, 80, 127],
            vec![0xB2, 81, 127],
            vec![0xC2, 1],
        ]);
    }

    #[test]
    fn volume_level_clamps() {
        let mut sink = MidiSink::new(Vec::new(), 0, "test");
        for _ in 0..10 { sink.deliver(&Action::Volume { delta: -5 }); }
        assert_eq!(sink.volume(), 0);
        for _ in 0..20 { sink.deliver(&Action::Volume { delta: 5 }); }
        assert_eq!(sink.volume(), 127);
        assert_eq!(sink.wire().last(), Some(&vec![0xB0, 7, 127]));
    }

    #[test]
    fn port_selection() {
        let names = vec!["Midi Through".to_string(), "loopMIDI Port".to_string()];
        assert_eq!(pick_port(&names, None), Some(0));
        assert_eq!(pick_port(&names, Some("LOOPMIDI")), Some(1));
        assert_eq!(pick_port(&names, Some("fluid")), None);
        assert_eq!(pick_port(&[], None), None);
    }
}
