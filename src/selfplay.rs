//! Self-play game generation.
//!
//! Plays complete games from a scenario with every unit following the default
//! rollout policy, and records each ply. Games can run concurrently; each one
//! owns its own state.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{Coord, Damage, Side, UnitId};
use crate::error::{Result, SimError};
use crate::game::{GameState, Resolution};
use crate::movegen::default_policy;
use crate::scenario::Scenario;
use crate::search::rollout::apply_chosen;

/// Configuration for self-play runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Plies after which a game is abandoned as a draw.
    pub max_plies: usize,
    /// Worker threads; 1 plays games sequentially.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            max_plies: 400,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// One recorded ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub ply: usize,
    pub unit: UnitId,
    pub side: Side,
    pub move_to: Coord,
    pub target: Option<Coord>,
    /// Unit killed by this ply's strike, if any.
    pub killed: Option<UnitId>,
}

/// A complete self-play game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// None when the ply limit ended the game.
    pub winner: Option<Side>,
    pub plies: usize,
    /// Units alive at the end, in turn order.
    pub survivors: Vec<UnitId>,
    pub turns: Vec<TurnRecord>,
}

fn seeded_rng(seed: u64, game_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays a single game and returns its record.
pub fn play_game(
    scenario: &Scenario,
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord> {
    let mut state = GameState::from_scenario(scenario)?;
    let mut turns = Vec::new();
    let mut outcome = state.outcome()?;

    while !outcome.is_terminal() && turns.len() < config.max_plies {
        let actor = state
            .active_unit()
            .map(|u| (u.id, u.side))
            .ok_or(SimError::NoSidesRemaining)?;
        let actions = state.legal_actions()?;
        let Some(action) = default_policy(&actions, rng).copied() else {
            break;
        };

        let killed = match apply_chosen(&mut state, &action)? {
            Resolution::Attacked(Damage::Killed { target }) => Some(target),
            _ => None,
        };
        turns.push(TurnRecord {
            ply: turns.len(),
            unit: actor.0,
            side: actor.1,
            move_to: action.move_to,
            target: action.target,
            killed,
        });

        outcome = state.advance()?;
    }

    Ok(GameRecord {
        game_id,
        winner: outcome.winner(),
        plies: turns.len(),
        survivors: state.turns().slots().iter().map(|s| s.id).collect(),
        turns,
    })
}

/// Runs self-play, returning every game record.
pub fn run_self_play(scenario: &Scenario, config: &SelfPlayConfig) -> Result<Vec<GameRecord>> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(scenario, config, |game| games.push(game))?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play, handing each finished game to `on_game` as it completes.
pub fn run_self_play_with_callback<F>(
    scenario: &Scenario,
    config: &SelfPlayConfig,
    on_game: F,
) -> Result<()>
where
    F: FnMut(GameRecord) + Send,
{
    scenario.validate()?;
    if config.threads > 1 {
        run_self_play_parallel(scenario, config, on_game)
    } else {
        run_self_play_sequential(scenario, config, on_game)
    }
}

fn log_game(config: &SelfPlayConfig, finished: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    let outcome = match game.winner {
        Some(side) => format!("{} wins", side.name()),
        None => "draw".to_string(),
    };
    info!(
        "Game {}/{}: {} after {} plies ({:.2}s)",
        finished,
        config.num_games,
        outcome,
        game.plies,
        started.elapsed().as_secs_f64(),
    );
}

fn run_self_play_sequential<F>(scenario: &Scenario, config: &SelfPlayConfig, mut on_game: F) -> Result<()>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let mut rng = seeded_rng(config.seed, i);
        let game = play_game(scenario, config, i, &mut rng)?;
        log_game(config, i + 1, &game, started);
        on_game(game);
    }
    Ok(())
}

/// Plays games on a rayon pool and delivers them over a channel so the
/// callback always runs on the calling thread.
fn run_self_play_parallel<F>(scenario: &Scenario, config: &SelfPlayConfig, mut on_game: F) -> Result<()>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord>>();

    let mut first_error = None;
    std::thread::scope(|scope| {
        let completed = &completed;
        scope.spawn(move || {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let started = Instant::now();
                        let mut rng = seeded_rng(config.seed, i);
                        let result = play_game(scenario, config, i, &mut rng);
                        if let Ok(game) = &result {
                            let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            log_game(config, n, game, started);
                        }
                        let _ = tx.send(result);
                    });
            });
        });

        for result in rx {
            match result {
                Ok(game) => on_game(game),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
    });

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Writes game records as JSONL, one game per line.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Aggregate numbers over a batch of games.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub player_wins: usize,
    pub ai_wins: usize,
    pub draws: usize,
    pub avg_plies: f64,
}

pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Default::default()
    };
    let mut total_plies = 0usize;
    for game in games {
        total_plies += game.plies;
        match game.winner {
            Some(Side::Player) => summary.player_wins += 1,
            Some(Side::Ai) => summary.ai_wins += 1,
            None => summary.draws += 1,
        }
    }
    summary.avg_plies = total_plies as f64 / games.len().max(1) as f64;
    summary
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let s = summarize(games);
    let pct = |n: usize| 100.0 * n as f64 / s.games.max(1) as f64;
    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", s.games);
    eprintln!("Avg plies/game: {:.1}", s.avg_plies);
    eprintln!("  player: {} ({:.1}%)", s.player_wins, pct(s.player_wins));
    eprintln!("      ai: {} ({:.1}%)", s.ai_wins, pct(s.ai_wins));
    eprintln!("   draws: {} ({:.1}%)", s.draws, pct(s.draws));
}
