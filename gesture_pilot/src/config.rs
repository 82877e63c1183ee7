//! `gesture_pilot.toml`: every field optional, a missing file means defaults.
//!
//! ```toml
//! landmarks_dir = "landmarks"
//! gestures      = ["rock", "paper", "scissors", "heart", "phone"]
//! apps          = ["Edge", "Spotify", "Discord"]
//!
//! [classifier]
//! mode = "top_k"          # or "nearest"
//! k = 3
//! ambiguity_ratio = 0.85
//!
//! [tracker]
//! capacity = 5
//! movement_threshold_px = 40.0
//! idle_threshold_px = 15.0
//! suppress_when_all_extended = false
//!
//! [debounce]
//! cooldown_ms = 1000
//! entry_ignore_frames = 10
//!
//! [midi]
//! enabled = true
//! port_hint = "loopMIDI"
//! channel = 0
//!
//! [[bindings]]
//! fingers = "index_up"
//! direction = "up"
//! command = "volume_up"
//! ```
//!
//! A `[[bindings]]` list, when present, replaces the default table entirely.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use gesture_match::ClassifierConfig;
use swipe_control::{Binding, CommandTable, DebounceConfig, TrackerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Read { path: PathBuf, #[source] source: io::Error },

    #[error("parsing {}: {source}", path.display())]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

// ════════════════════════════════════════════════════════════════════════════
// MidiConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    pub enabled:   bool,
    /// Case-insensitive substring of the output port name.  Unset: first port.
    pub port_hint: Option<String>,
    /// 0–15.
    pub channel:   u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        MidiConfig { enabled: true, port_hint: None, channel: 0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PilotConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub landmarks_dir: PathBuf,
    /// Gesture names to load; order breaks score ties.
    pub gestures:      Vec<String>,
    /// Applications cycled by `next_app` / `prev_app`.
    pub apps:          Vec<String>,
    pub classifier:    ClassifierConfig,
    pub tracker:       TrackerConfig,
    pub debounce:      DebounceConfig,
    pub midi:          MidiConfig,
    pub bindings:      Vec<Binding>,
}

impl Default for PilotConfig {
    fn default() -> Self {
        PilotConfig {
            landmarks_dir: PathBuf::from("landmarks"),
            gestures: ["rock", "paper", "scissors", "heart", "phone"]
                .into_iter().map(String::from).collect(),
            apps: ["Edge", "Spotify", "Discord"]
                .into_iter().map(String::from).collect(),
            classifier: ClassifierConfig::default(),
            tracker:    TrackerConfig::default(),
            debounce:   DebounceConfig::default(),
            midi:       MidiConfig::default(),
            bindings:   CommandTable::default().bindings().to_vec(),
        }
    }
}

impl PilotConfig {
    pub fn from_toml(text: &str) -> Result<PilotConfig, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<PilotConfig, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                return Ok(PilotConfig::default());
            }
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        let cfg = PilotConfig::from_toml(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        info!(path = %path.display(), bindings = cfg.bindings.len(), "config loaded");
        Ok(cfg)
    }

    pub fn command_table(&self) -> CommandTable {
        CommandTable::new(self.bindings.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_match::MatchMode;
    use hand_pose::FingerState;
    use swipe_control::{Command, Direction, FingerPattern};

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(PilotConfig::from_toml("").unwrap(), PilotConfig::default());
    }

    #[test]
    fn defaults_match_media_controller() {
        let c = PilotConfig::default();
        assert_eq!(c.apps, vec!["Edge", "Spotify", "Discord"]);
        assert_eq!(c.tracker.capacity, 5);
        assert_eq!(c.debounce.cooldown_ms, 1000);
        assert_eq!(c.debounce.entry_ignore_frames, 10);
        assert_eq!(c.classifier.k, 3);
        assert!(c.midi.enabled);
        assert_eq!(c.command_table(), CommandTable::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = PilotConfig::from_toml(r#"
            apps = ["Firefox"]

            [classifier]
            mode = "nearest"

            [debounce]
            cooldown_ms = 500
        "#).unwrap();
        assert_eq!(c.apps, vec!["Firefox"]);
        assert_eq!(c.classifier.mode, MatchMode::Nearest);
        assert_eq!(c.classifier.k, 3);
        assert_eq!(c.classifier.rejection_ratio(), None);
        assert_eq!(c.debounce.cooldown_ms, 500);
        assert_eq!(c.debounce.entry_ignore_frames, 10);
        assert_eq!(c.tracker, TrackerConfig::default());
    }

    #[test]
    fn bindings_replace_the_table() {
        let c = PilotConfig::from_toml(r#"
            [[bindings]]
            fingers = "any"
            direction = "up_left"
            command = "play"

            [[bindings]]
            fingers = { exact = [false, true, true, false, false] }
            direction = "down"
            command = "pause"
        "#).unwrap();
        assert_eq!(c.bindings.len(), 2);
        assert_eq!(c.bindings[1].fingers, FingerPattern::Exact([false, true, true, false, false]));
        let table = c.command_table();
        let peace = FingerState::from_flags([false, true, true, false, false]);
        assert_eq!(table.lookup(&peace, Direction::Down), Some(Command::Pause));
        assert_eq!(table.lookup(&peace, Direction::Up), None);
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        let r = PilotConfig::from_toml(r#"
            [[bindings]]
            fingers = "any"
            direction = "up"
            command = "launch_rockets"
        "#);
        assert!(r.is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("gesture_pilot_absent_{}.toml", std::process::id()));
        assert_eq!(PilotConfig::load(&path).unwrap(), PilotConfig::default());
    }

    #[test]
    fn bad_file_reports_path() {
        let path = std::env::temp_dir().join(format!("gesture_pilot_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "gestures = 3").unwrap();
        let err = PilotConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("gesture_pilot_bad_"));
        std::fs::remove_file(&path).unwrap();
    }
}
