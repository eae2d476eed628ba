//! Boundary to tree search.
//!
//! A search algorithm only needs to enumerate actions, apply one, pass the
//! turn, check for a winner, and copy the state. [`SearchState`] is that
//! surface; [`expand`] builds child nodes from it. Node statistics and the
//! selection policy belong to the caller.

pub mod rollout;

pub use rollout::{parallel_playouts, playout, Playout, PlayoutTally};

use crate::board::Action;
use crate::error::Result;
use crate::game::{GameState, Resolution};
use crate::turn::TurnOutcome;

/// What a tree search needs from a game state.
pub trait SearchState: Clone + Send {
    type Action: Clone;

    /// Actions available to the side to move. Empty when the game is over.
    fn legal_actions(&self) -> Result<Vec<Self::Action>>;

    /// Applies an action. Returns false if the state rejected it.
    fn apply_action(&mut self, action: &Self::Action) -> Result<bool>;

    /// Passes the turn, or reports the winner.
    fn advance(&mut self) -> Result<TurnOutcome>;

    fn outcome(&self) -> Result<TurnOutcome>;
}

impl SearchState for GameState {
    type Action = Action;

    fn legal_actions(&self) -> Result<Vec<Action>> {
        GameState::legal_actions(self)
    }

    fn apply_action(&mut self, action: &Action) -> Result<bool> {
        let resolution = self.apply(action)?;
        self.clear_transient_marks();
        Ok(!matches!(resolution, Resolution::Rejected(_)))
    }

    fn advance(&mut self) -> Result<TurnOutcome> {
        GameState::advance(self)
    }

    fn outcome(&self) -> Result<TurnOutcome> {
        GameState::outcome(self)
    }
}

/// A child node: the action taken and the state after the turn passed.
#[derive(Debug, Clone)]
pub struct Child<S: SearchState> {
    pub action: S::Action,
    pub state: S,
    pub outcome: TurnOutcome,
}

/// Produces one child per legal action, each on its own copy of `parent`.
pub fn expand<S: SearchState>(parent: &S) -> Result<Vec<Child<S>>> {
    let actions = parent.legal_actions()?;
    let mut children = Vec::with_capacity(actions.len());
    for action in actions {
        let mut state = parent.clone();
        if !state.apply_action(&action)? {
            continue;
        }
        let outcome = state.advance()?;
        children.push(Child {
            action,
            state,
            outcome,
        });
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Side, UnitId};
    use crate::scenario::{PolicySpec, Scenario, UnitSpec};

    fn spec(side: Side, row: usize, col: usize, health: i32) -> UnitSpec {
        UnitSpec {
            side,
            row,
            col,
            health,
            damage: 10,
            movement: 1,
            attack_range: 1,
            target: None,
            policy: PolicySpec::Free,
        }
    }

    fn duel() -> GameState {
        GameState::from_scenario(&Scenario {
            height: 3,
            width: 3,
            units: vec![spec(Side::Ai, 0, 0, 10), spec(Side::Player, 0, 1, 10)],
        })
        .unwrap()
    }

    #[test]
    fn expand_yields_one_child_per_action() {
        let root = duel().snapshot().unwrap();
        let actions = SearchState::legal_actions(&root).unwrap();
        let children = expand(&root).unwrap();
        assert_eq!(children.len(), actions.len());
        // Hold, hold+strike, step down.
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn expanding_does_not_touch_parent() {
        let root = duel();
        let before = root.board().clone();
        let children = expand(&root).unwrap();
        assert_eq!(root.board(), &before);
        assert_eq!(root.turns().active(), Some(UnitId(0)));
        assert!(children.iter().all(|c| c.state.board().check_invariants().is_ok()));
    }

    #[test]
    fn winning_child_is_terminal() {
        let children = expand(&duel()).unwrap();
        let win = children
            .iter()
            .find(|c| c.action.target == Some(Coord::new(0, 1)))
            .unwrap();
        assert_eq!(win.outcome, TurnOutcome::AiWins);
        assert!(expand(&win.state).unwrap().is_empty());

        let quiet: Vec<_> = children.iter().filter(|c| c.action.target.is_none()).collect();
        for child in quiet {
            assert_eq!(child.outcome, TurnOutcome::Continue);
            assert_eq!(child.state.turns().active(), Some(UnitId(1)));
        }
    }
}
