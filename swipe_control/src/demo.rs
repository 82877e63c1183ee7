//! Scripted walk-through of the swipe pipeline on synthetic hands.

use std::time::{Duration, Instant};

use hand_pose::synth::{synth_hand, HandShape};
use hand_pose::FingerState;
use swipe_control::{CommandTable, DebounceConfig, SwipeSession, TrackerConfig};
use tracing_subscriber::EnvFilter;

const SIZE: (usize, usize) = (640, 480);
const FRAME: Duration = Duration::from_millis(33);

/// Drive one session through `frames` hand positions and print every frame
/// that changed something.
fn run(
    label: &str,
    session: &mut SwipeSession,
    table: &CommandTable,
    clock: &mut Instant,
    frames: impl IntoIterator<Item = Option<(HandShape, (f64, f64))>>,
) {
    println!("{}", label);
    let mut last = String::new();
    for (i, f) in frames.into_iter().enumerate() {
        let hand = f.map(|(shape, c)| synth_hand(shape, c, 0.2));
        let out = session.step_frame(hand.as_ref(), SIZE, *clock);
        *clock += FRAME;

        let desc = out.describe();
        if let Some(ev) = out.fired {
            let fingers = out.fingers.unwrap_or_default();
            match table.lookup(&fingers, ev.direction) {
                Some(cmd) => println!("   [{:>3}] {}  →  {}", i, desc, cmd),
                None      => println!("   [{:>3}] {}  →  (unbound for {} fingers)", i, desc, fingers.extended_count()),
            }
        } else if desc != last {
            println!("   [{:>3}] {}", i, desc);
        }
        last = desc;
    }
    println!();
}

fn linear(shape: HandShape, from: (f64, f64), to: (f64, f64), n: usize) -> Vec<Option<(HandShape, (f64, f64))>> {
    (0..n).map(|i| {
        let t = i as f64 / (n - 1).max(1) as f64;
        Some((shape, (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)))
    }).collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swipe_control=info")),
        )
        .init();

    println!("\n=== Swipe pipeline demo ===\n");
    let table = CommandTable::default();
    let mut clock = Instant::now();

    // ── 1. Appear and immediately swipe up ────────────────────────────────
    let mut s = SwipeSession::new(TrackerConfig::default(), DebounceConfig::default());
    run("1. Pointing hand appears and swipes up at once", &mut s, &table, &mut clock,
        linear(HandShape::Point, (0.5, 0.8), (0.5, 0.2), 20));

    // ── 2. Held swipe, cooldown ───────────────────────────────────────────
    let mut s = SwipeSession::new(TrackerConfig::default(), DebounceConfig::default());
    let mut frames = vec![Some((HandShape::Point, (0.1, 0.5))); 11];
    frames.extend(linear(HandShape::Point, (0.1, 0.5), (0.9, 0.5), 40));
    run("2. Long rightward sweep (one command per second)", &mut s, &table, &mut clock, frames);

    // ── 3. Stationary then open-palm swipe ────────────────────────────────
    let mut s = SwipeSession::new(TrackerConfig::default(), DebounceConfig::default());
    let mut frames = vec![Some((HandShape::Paper, (0.2, 0.5))); 16];
    frames.extend(linear(HandShape::Paper, (0.2, 0.5), (0.7, 0.5), 8));
    run("3. Open palm rests, then swipes right (app switch)", &mut s, &table, &mut clock, frames);

    // ── 4. Hand lost mid-swipe ────────────────────────────────────────────
    let mut s = SwipeSession::new(TrackerConfig::default(), DebounceConfig::default());
    let mut frames = vec![Some((HandShape::Point, (0.5, 0.5))); 12];
    frames.extend(std::iter::repeat(None).take(3));
    frames.extend(linear(HandShape::Point, (0.5, 0.2), (0.5, 0.8), 16));
    run("4. Hand leaves and returns swiping down", &mut s, &table, &mut clock, frames);

    let open = FingerState::from_flags([true; 5]);
    println!("Open palm: {} fingers extended, suppression {}.",
             open.extended_count(),
             if TrackerConfig::default().suppress_when_all_extended { "on" } else { "off" });
}
