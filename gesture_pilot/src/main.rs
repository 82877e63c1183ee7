//! gesture_pilot — interactive entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gesture_match::MatchMode;
use gesture_pilot::app::run;
use gesture_pilot::config::PilotConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_pilot", about = "Control media playback with hand gestures")]
struct Args {
    /// TOML config file; missing means defaults.
    #[arg(long, default_value = "gesture_pilot.toml")]
    config: PathBuf,

    /// Override the exemplar directory.
    #[arg(long)]
    landmarks_dir: Option<PathBuf>,

    /// Capture the first hand seen as an exemplar of this gesture.
    #[arg(long, value_name = "GESTURE")]
    capture: Option<String>,

    /// Log commands instead of sending MIDI.
    #[arg(long)]
    no_midi: bool,

    /// Single nearest exemplar, no ambiguity rejection.
    #[arg(long)]
    legacy_nearest: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("gesture_pilot=info,gesture_match=info,swipe_control=info")
        }))
        .init();

    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Pilot — Hand-Gesture Media Controller       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");

    let mut cfg = PilotConfig::load(&args.config)?;
    if let Some(dir) = args.landmarks_dir {
        cfg.landmarks_dir = dir;
    }
    if args.no_midi {
        cfg.midi.enabled = false;
    }
    if args.legacy_nearest {
        cfg.classifier.mode = MatchMode::Nearest;
    }

    let matching = match cfg.classifier.mode {
        MatchMode::TopK    => format!("top-{} average", cfg.classifier.k),
        MatchMode::Nearest => "nearest exemplar".to_string(),
    };
    println!("  Matching: {}", matching);
    println!("  Exemplars: {}", cfg.landmarks_dir.display());
    if let Some(g) = &args.capture {
        println!("  Capture armed: {}", g);
    }
    println!();
    println!("  Opening visualizer window…");
    println!();

    info!(config = %args.config.display(), "starting");
    run(cfg, args.capture)
}
