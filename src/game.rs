//! Game state: board plus turn order, threaded explicitly through every
//! operation.
//!
//! A `GameState` is either the live session or a disposable copy used by a
//! search rollout. Copies come from [`GameState::snapshot`] (live to search)
//! or `Clone` (search node to child); neither shares mutable state with its
//! source.

use std::sync::Arc;

use tracing::debug;

use crate::board::{Action, BoardState, Coord, Damage, MovementPolicy, Unit, UnitId};
use crate::error::{Result, SimError};
use crate::movegen::{legal_actions, targets_from};
use crate::scenario::Scenario;
use crate::turn::{TurnOrder, TurnOutcome, TurnSlot};

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The acting unit is not the one whose turn it is.
    NotActive,
    /// The destination is not reachable this turn.
    Unreachable,
    /// The target cell is outside the attack pattern from the destination.
    OutOfRange,
    /// The target cell does not hold a unit of the attacker's target side.
    WrongTarget,
}

/// What applying an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing changed.
    Rejected(Rejection),
    Moved,
    Attacked(Damage),
}

/// Board, turn order, and the immutable setup order shared by all copies.
#[derive(Debug, Clone)]
pub struct GameState {
    board: BoardState,
    turns: TurnOrder,
    template: Arc<[UnitId]>,
}

impl GameState {
    /// Builds the live state from a scenario. The first unit listed moves first.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self> {
        scenario.validate()?;
        let mut board = BoardState::new(scenario.height, scenario.width)?;
        let mut slots = Vec::with_capacity(scenario.units.len());
        for (i, spec) in scenario.units.iter().enumerate() {
            let id = UnitId(i);
            let mut unit = Unit::new(
                id,
                spec.side,
                spec.coord(),
                spec.stats(),
                spec.policy(scenario.height),
            );
            if let Some(target) = spec.target {
                unit.target = target;
            }
            slots.push(TurnSlot {
                id,
                side: spec.side,
            });
            board.place_unit(unit)?;
        }
        let template: Arc<[UnitId]> = slots.iter().map(|s| s.id).collect();
        Ok(GameState {
            board,
            turns: TurnOrder::new(slots, 0),
            template,
        })
    }

    /// Wraps an already populated board; turn order follows slot ids.
    pub fn from_board(board: BoardState) -> Result<Self> {
        board.check_invariants()?;
        let slots: Vec<TurnSlot> = board
            .units()
            .map(|u| TurnSlot {
                id: u.id,
                side: u.side,
            })
            .collect();
        if slots.is_empty() {
            return Err(SimError::NoSidesRemaining);
        }
        let template: Arc<[UnitId]> = slots.iter().map(|s| s.id).collect();
        Ok(GameState {
            board,
            turns: TurnOrder::new(slots, 0),
            template,
        })
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn turns(&self) -> &TurnOrder {
        &self.turns
    }

    /// Setup order of every unit, dead or alive.
    pub fn template(&self) -> &[UnitId] {
        &self.template
    }

    /// The unit whose turn it is.
    pub fn active_unit(&self) -> Option<&Unit> {
        self.board.unit(self.turns.active()?)
    }

    /// An isolated copy for search, positioned at `live_turn_index`.
    ///
    /// Clones the board, rebuilds the turn order over the clone from the setup
    /// order, then advances once so the copy starts on a live unit.
    pub fn snapshot_at(&self, live_turn_index: usize) -> Result<GameState> {
        let board = self.board.clone();
        let turns = TurnOrder::rebind(&self.board, &board, &self.template, live_turn_index)?;
        let mut snapshot = GameState {
            board,
            turns,
            template: Arc::clone(&self.template),
        };
        snapshot.turns.advance()?;
        Ok(snapshot)
    }

    /// Snapshot positioned at this state's own current turn.
    pub fn snapshot(&self) -> Result<GameState> {
        self.snapshot_at(self.turns.cursor())
    }

    /// Legal actions for the active unit. Empty once the game is decided.
    pub fn legal_actions(&self) -> Result<Vec<Action>> {
        if self.outcome()?.is_terminal() {
            return Ok(Vec::new());
        }
        match self.turns.active() {
            Some(id) => legal_actions(&self.board, id),
            None => Ok(Vec::new()),
        }
    }

    /// Marks the active unit's destinations on the board and returns them.
    pub fn highlight_moves(&mut self) -> Result<Vec<Coord>> {
        let Some(unit) = self.active_unit() else {
            return Ok(Vec::new());
        };
        let cells: Vec<Coord> = unit
            .policy
            .destinations(unit, &self.board)
            .into_iter()
            .filter(|c| *c != unit.position)
            .collect();
        self.board.highlight(&cells)?;
        Ok(cells)
    }

    pub fn clear_transient_marks(&mut self) {
        self.board.clear_transient_marks();
    }

    /// Validates and applies an action for the active unit.
    ///
    /// Illegal actions are rejected without touching the state. Legal ones
    /// move the unit, then strike the target.
    pub fn apply(&mut self, action: &Action) -> Result<Resolution> {
        if self.turns.active() != Some(action.unit) {
            return Ok(Resolution::Rejected(Rejection::NotActive));
        }
        let from = self
            .board
            .location_of(action.unit)
            .ok_or(SimError::UnitNotInTurnOrder(action.unit))?;
        let unit = self.board.occupant(from)?.ok_or(SimError::NoUnit(from))?;

        if !unit.policy.destinations(unit, &self.board).contains(&action.move_to) {
            return Ok(Resolution::Rejected(Rejection::Unreachable));
        }

        let damage = unit.damage;
        if let Some(target) = action.target {
            if !unit
                .policy
                .attack_cells(unit, action.move_to, &self.board)
                .contains(&target)
            {
                return Ok(Resolution::Rejected(Rejection::OutOfRange));
            }
            if !targets_from(unit, action.move_to, &self.board)?.contains(&target) {
                return Ok(Resolution::Rejected(Rejection::WrongTarget));
            }
        }

        self.board.move_unit(from, action.move_to)?;
        match action.target {
            Some(target) => Ok(Resolution::Attacked(self.damage_unit(target, damage)?)),
            None => Ok(Resolution::Moved),
        }
    }

    /// Deals damage to the unit at `at`. A unit reduced to zero health leaves
    /// the board and the turn order here and nowhere else.
    pub fn damage_unit(&mut self, at: Coord, amount: i32) -> Result<Damage> {
        let result = self.board.damage(at, amount)?;
        if let Damage::Killed { target } = result {
            self.turns.remove_unit(target)?;
            debug!(unit = %target, %at, "unit killed");
        }
        Ok(result)
    }

    /// Passes the turn, or reports the winner if the game is over.
    pub fn advance(&mut self) -> Result<TurnOutcome> {
        self.turns.advance()
    }

    pub fn outcome(&self) -> Result<TurnOutcome> {
        self.turns.is_game_over()
    }
}
