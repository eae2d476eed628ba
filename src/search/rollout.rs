//! Random playouts.
//!
//! A playout consumes its own copy of the state and plays the default policy
//! until one side is wiped out or the ply budget runs out. Parallel playouts
//! each own a disjoint clone; nothing is shared between workers except the
//! read-only starting state.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::board::Action;
use crate::error::{Result, SimError};
use crate::game::{GameState, Resolution};
use crate::movegen::default_policy;
use crate::turn::TurnOutcome;

/// How a single playout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playout {
    /// `Continue` if the ply budget ran out first.
    pub outcome: TurnOutcome,
    pub plies: usize,
}

/// Aggregated playout results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayoutTally {
    pub player_wins: usize,
    pub ai_wins: usize,
    pub unfinished: usize,
}

impl PlayoutTally {
    pub fn record(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::PlayerWins => self.player_wins += 1,
            TurnOutcome::AiWins => self.ai_wins += 1,
            TurnOutcome::Continue => self.unfinished += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.player_wins + self.ai_wins + self.unfinished
    }

    /// Fraction of playouts won by the given side.
    pub fn win_rate(&self, outcome: TurnOutcome) -> f64 {
        let wins = match outcome {
            TurnOutcome::PlayerWins => self.player_wins,
            TurnOutcome::AiWins => self.ai_wins,
            TurnOutcome::Continue => self.unfinished,
        };
        wins as f64 / self.total().max(1) as f64
    }
}

/// Applies an action picked from the state's own legal actions.
///
/// Such an action can only be rejected if move generation and validation
/// disagree, so a rejection is reported as a broken invariant.
pub(crate) fn apply_chosen(state: &mut GameState, action: &Action) -> Result<Resolution> {
    match state.apply(action)? {
        Resolution::Rejected(reason) => {
            debug!(%action, ?reason, "generated action rejected");
            Err(SimError::BrokenInvariant {
                at: action.move_to,
                reason: "generated action was rejected",
            })
        }
        resolution => Ok(resolution),
    }
}

/// Plays the default policy from `state` for at most `max_plies` turns.
pub fn playout(mut state: GameState, rng: &mut SmallRng, max_plies: usize) -> Result<Playout> {
    let mut plies = 0;
    loop {
        let outcome = state.outcome()?;
        if outcome.is_terminal() {
            return Ok(Playout { outcome, plies });
        }
        if plies >= max_plies {
            debug!(plies, "playout hit ply limit");
            return Ok(Playout {
                outcome: TurnOutcome::Continue,
                plies,
            });
        }

        let actions = state.legal_actions()?;
        if let Some(action) = default_policy(&actions, rng) {
            apply_chosen(&mut state, action)?;
        }
        plies += 1;

        let outcome = state.advance()?;
        if outcome.is_terminal() {
            return Ok(Playout { outcome, plies });
        }
    }
}

/// Runs `count` playouts on separate clones of `state` across `threads`
/// workers. A non-zero `seed` makes the result reproducible.
pub fn parallel_playouts(
    state: &GameState,
    count: usize,
    max_plies: usize,
    seed: u64,
    threads: usize,
) -> Result<PlayoutTally> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let results: Vec<Playout> = pool.install(|| {
        (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = if seed != 0 {
                    SmallRng::seed_from_u64(seed.wrapping_add(i as u64))
                } else {
                    SmallRng::from_entropy()
                };
                playout(state.clone(), &mut rng, max_plies)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut tally = PlayoutTally::default();
    for p in results {
        tally.record(p.outcome);
    }
    Ok(tally)
}
