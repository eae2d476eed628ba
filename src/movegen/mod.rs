//! Legal action generation.
//!
//! Enumerates every action the active unit may take from the current board,
//! and provides the cheap default policy used to pick actions during
//! rollouts.

use rand::Rng;

use crate::board::{Action, BoardState, Coord, MovementPolicy, Unit, UnitId};
use crate::error::{Result, SimError};

/// Cells holding a unit that `unit` may strike after moving to `from`.
pub fn targets_from(unit: &Unit, from: Coord, board: &BoardState) -> Result<Vec<Coord>> {
    let mut out = Vec::new();
    for at in unit.policy.attack_cells(unit, from, board) {
        let cell = board.cell(at)?;
        match cell.unit() {
            Some(other) if other.id != unit.id && unit.can_target(cell.marker()) => out.push(at),
            _ => {}
        }
    }
    Ok(out)
}

/// Generates all legal actions for the unit in slot `id`.
///
/// Each reachable destination (the unit's own cell included) yields a plain
/// move plus one strike per valid target from there. Returns an error if the
/// unit is not on the board.
pub fn legal_actions(board: &BoardState, id: UnitId) -> Result<Vec<Action>> {
    let at = board.location_of(id).ok_or(SimError::UnitNotInTurnOrder(id))?;
    let unit = board.occupant(at)?.ok_or(SimError::NoUnit(at))?;

    let mut actions = Vec::new();
    for dest in unit.policy.destinations(unit, board) {
        actions.push(Action::step(id, dest));
        for target in targets_from(unit, dest, board)? {
            actions.push(Action::strike(id, dest, target));
        }
    }
    Ok(actions)
}

/// Default rollout policy: a random strike if any is available, otherwise a
/// random move. Returns None only for an empty action list.
pub fn default_policy<'a>(actions: &'a [Action], rng: &mut impl Rng) -> Option<&'a Action> {
    let strikes: Vec<&Action> = actions.iter().filter(|a| a.is_attack()).collect();
    if !strikes.is_empty() {
        return Some(strikes[rng.gen_range(0..strikes.len())]);
    }
    if actions.is_empty() {
        return None;
    }
    Some(&actions[rng.gen_range(0..actions.len())])
}
