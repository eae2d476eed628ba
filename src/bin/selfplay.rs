//! Self-play game generation CLI.
//!
//! Plays skirmish games with the default rollout policy on both sides and
//! outputs one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N         Number of games to play (default: 10)
//!   --max-plies N     Ply limit per game (default: 400)
//!   --threads N       Number of parallel threads (default: 4)
//!   --seed N          Random seed, 0 for entropy (default: 0)
//!   --scenario FILE   Scenario JSON (default: built-in 5x5 skirmish)
//!   --output FILE     Output file path (default: stdout)
//!   --quiet           Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use skirmish::scenario::Scenario;
use skirmish::selfplay::{self, SelfPlayConfig};
use tracing_subscriber::EnvFilter;

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut scenario_path: Option<String> = None;
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games");
            }
            "--max-plies" => {
                i += 1;
                config.max_plies = value(&args, i, "--max-plies");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed");
            }
            "--scenario" => {
                i += 1;
                scenario_path = Some(value(&args, i, "--scenario"));
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let default_level = if config.quiet { "skirmish=warn" } else { "skirmish=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&config, scenario_path.as_deref(), output_path.as_deref()) {
        eprintln!("selfplay: {}", e);
        process::exit(1);
    }
}

fn run(
    config: &SelfPlayConfig,
    scenario_path: Option<&str>,
    output_path: Option<&str>,
) -> skirmish::Result<()> {
    let scenario = match scenario_path {
        Some(path) => Scenario::load(path)?,
        None => Scenario::skirmish(),
    };

    if !config.quiet {
        eprintln!(
            "Self-play: {} games on a {}x{} board with {} units, max {} plies, {} threads",
            config.num_games,
            scenario.height,
            scenario.width,
            scenario.units.len(),
            config.max_plies,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&scenario, config)?;
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/s)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64().max(1e-9)
        );
        selfplay::print_summary(&games);
    }

    match output_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path);
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N         Number of games to play (default: 10)");
    eprintln!("  --max-plies N     Ply limit per game (default: 400)");
    eprintln!("  --threads N       Number of parallel threads (default: 4)");
    eprintln!("  --seed N          Random seed, 0 for entropy (default: 0)");
    eprintln!("  --scenario FILE   Scenario JSON (default: built-in 5x5 skirmish)");
    eprintln!("  --output FILE     Output file path (default: stdout)");
    eprintln!("  --quiet           Suppress progress and summary output");
    eprintln!("  --help            Show this help");
}
