//! Interactive inspector for an exemplar directory.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gesture_match::{leave_one_out, Classifier, ClassifierConfig, Library, MatchMode};
use hand_pose::synth::{jittered, synth_hand, HandShape};

#[derive(Parser, Debug)]
#[command(name = "exemplar_menu", about = "Inspect and self-test a directory of gesture exemplars")]
struct Args {
    /// Directory holding `{gesture}_landmarks{n}.npy` files.
    #[arg(long, default_value = "landmarks")]
    dir: PathBuf,

    /// Gesture names to load, comma separated.
    #[arg(long, value_delimiter = ',', default_value = "rock,paper,scissors,heart,phone")]
    gestures: Vec<String>,

    /// Start in nearest-neighbour mode.
    #[arg(long)]
    nearest: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gesture_match=info")),
        )
        .init();

    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Gesture Exemplar Inspector                  ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mut library = Library::open(&args.dir, args.gestures.iter().cloned())
        .with_context(|| format!("opening exemplar directory {}", args.dir.display()))?;
    let mut classifier = Classifier::new(if args.nearest {
        ClassifierConfig::nearest()
    } else {
        ClassifierConfig::default()
    });

    println!("  ✓  {} exemplars from {}", library.store().len(), args.dir.display());
    if library.skipped() > 0 {
        println!("  ⚠  {} unreadable files skipped", library.skipped());
    }
    println!();

    loop {
        print_menu(classifier.config().mode);
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                for (gesture, exemplars) in library.store().iter() {
                    let ids: Vec<String> = exemplars.iter().map(|e| e.id().to_string()).collect();
                    println!("  {:<12} {:>3}   [{}]", gesture, exemplars.len(), ids.join(" "));
                }
            }
            "2" => {
                let report = leave_one_out(&classifier, library.store());
                match report.accuracy() {
                    None => println!("  No exemplars to test."),
                    Some(acc) => {
                        println!("  {}/{} correct  ({:.1}%)", report.correct, report.total, acc * 100.0);
                        for ((expected, got), n) in &report.confusion {
                            println!("    {:<12} → {:<12} ×{}", expected, got, n);
                        }
                    }
                }
            }
            "3" => {
                let gesture = read_line("  Gesture: ").trim().to_string();
                let id: u32 = read_line("  Exemplar id: ").trim().parse().unwrap_or(1);
                let Some(e) = library.store().load(&gesture).iter().find(|e| e.id() == id) else {
                    println!("  ⚠  No exemplar {} #{}.", gesture, id);
                    println!();
                    continue;
                };
                let rest = library.store().without(&gesture, id);
                let scores = classifier.scores(e.vector(), &rest);
                for (rank, s) in scores.iter().enumerate() {
                    println!("    {}. {:<12} {:.4}", rank + 1, s.gesture, s.score);
                }
                println!("  Decision: {}", classifier.decide(&scores));
            }
            "4" => {
                let mode = match classifier.config().mode {
                    MatchMode::TopK    => MatchMode::Nearest,
                    MatchMode::Nearest => MatchMode::TopK,
                };
                // Rejection follows the mode unless forced.
                classifier.set_mode(mode);
                println!("  Mode: {:?}", mode);
            }
            "5" => {
                let n: u64 = read_line("  Synthetic exemplars per gesture (default 5): ")
                    .trim().parse().unwrap_or(5);
                let names: Vec<String> = library.store().gesture_names().map(str::to_string).collect();
                for gesture in names {
                    let Some(shape) = HandShape::from_name(&gesture) else {
                        println!("  ⚠  No synthetic shape for \"{}\".", gesture);
                        continue;
                    };
                    for i in 0..n {
                        let t = i as f64 / n.max(1) as f64;
                        let base = synth_hand(shape, (0.3 + 0.4 * t, 0.6 - 0.2 * t), 0.15 + 0.1 * t);
                        let seed = library.store().next_id(&gesture).map_or(0, u64::from) * 31 + i;
                        let frame = jittered(&base, 0.004, seed)?;
                        if let Err(e) = library.capture(&gesture, &frame) {
                            println!("  ⚠  {}", e);
                            break;
                        }
                    }
                    println!("  {:<12} now {}", gesture, library.store().load(&gesture).len());
                }
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
    Ok(())
}

fn print_menu(mode: MatchMode) {
    let mode = match mode {
        MatchMode::TopK    => "top-k  ",
        MatchMode::Nearest => "nearest",
    };
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. List gestures             4. Toggle mode ({})  │", mode);
    println!("  │  2. Leave-one-out self-test   5. Add synthetic exemplars│");
    println!("  │  3. Rank one exemplar         q. Quit                   │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    read_reply(&mut io::stdin().lock())
}

/// One line of input; end of input (or a read error) reads as "q".
fn read_reply(input: &mut impl BufRead) -> String {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => "q".to_string(),
        Ok(_)          => buf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_input_quits() {
        let mut empty: &[u8] = b"";
        assert_eq!(read_reply(&mut empty), "q");
    }

    #[test]
    fn lines_are_read_one_at_a_time() {
        let mut input: &[u8] = b"2\n3\n";
        assert_eq!(read_reply(&mut input), "2\n");
        assert_eq!(read_reply(&mut input), "3\n");
        assert_eq!(read_reply(&mut input), "q");
    }
}
