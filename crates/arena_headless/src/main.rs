//! Headless battle runner.
//!
//! Runs a battle between bundled sample strategies without any
//! rendering, printing the outcome to stdout and logs to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Default 800x600 field, spinner vs turret
//! cargo run -p arena_headless
//!
//! # Pick the lineup and pin the seed
//! cargo run -p arena_headless -- --bots spinner,rammer,wallrider --seed 7
//!
//! # Load a battle configuration from a RON file
//! cargo run -p arena_headless -- --config battle.ron --json
//! ```
//!
//! # Configuration format
//!
//! The `--config` file is RON for [`BattleConfig`], e.g.:
//!
//! ```ron
//! (width: 1000, height: 800, tick_period_ms: 50, seed: Some(42))
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::result::Result;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arena_bots::samples::{spec_for, SAMPLE_NAMES};
use arena_core::prelude::*;

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless battle runner for the robot combat arena")]
#[command(version)]
struct Cli {
    /// Battle configuration file (RON); defaults to an 800x600 field.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated sample strategies to pit against each other.
    #[arg(short, long, default_value = "spinner,turret")]
    bots: String,

    /// Override the battle RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop an undecided battle after this many turns (0 = never).
    #[arg(long, default_value = "5000")]
    max_turns: u64,

    /// Print the outcome as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum HeadlessError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error("unknown bot '{name}', expected one of: {known}")]
    UnknownBot { name: String, known: String },

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("failed to serialize outcome: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), HeadlessError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    let roster = cli
        .bots
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            spec_for(name).ok_or_else(|| HeadlessError::UnknownBot {
                name: name.to_string(),
                known: SAMPLE_NAMES.join(", "),
            })
        })
        .collect::<Result<Vec<AgentSpec>, _>>()?;

    let battle = Battle::new(config, roster)?;

    if cli.max_turns > 0 {
        spawn_turn_limit_watch(battle.handle(), cli.max_turns);
    }

    let outcome = battle.run()?;

    if cli.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        match &outcome.winner {
            Some(winner) => println!("winner: {winner} after {} turns", outcome.turns),
            None => println!(
                "no winner after {} turns ({:?})",
                outcome.turns, outcome.state
            ),
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<BattleConfig, HeadlessError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| {
                HeadlessError::ReadConfig {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            ron::from_str(&text).map_err(|source| HeadlessError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })
        }
        None => Ok(BattleConfig::default()),
    }
}

/// Stop a battle that two overly cautious bots would otherwise drag out
/// forever.
fn spawn_turn_limit_watch(handle: BattleHandle, max_turns: u64) {
    thread::spawn(move || loop {
        let stats = handle.statistics();
        if stats.state() != BattleState::Running {
            break;
        }
        if stats.turn() >= max_turns {
            tracing::warn!(max_turns, "turn limit reached, stopping battle");
            handle.stop();
            break;
        }
        thread::sleep(Duration::from_millis(50));
    });
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
