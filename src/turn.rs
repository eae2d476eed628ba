//! Turn sequencing.
//!
//! Round-robin over the units still alive, in the order fixed at setup.
//! Entries are dropped when their unit dies; the cursor is shifted so the
//! rotation neither skips nor repeats a unit.

use tracing::{debug, trace};

use crate::board::{BoardState, Side, UnitId};
use crate::error::{Result, SimError};

/// Result of a game-over check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    Continue,
    PlayerWins,
    AiWins,
}

impl TurnOutcome {
    /// The side that won, if the game is over.
    pub const fn winner(self) -> Option<Side> {
        match self {
            TurnOutcome::Continue => None,
            TurnOutcome::PlayerWins => Some(Side::Player),
            TurnOutcome::AiWins => Some(Side::Ai),
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, TurnOutcome::Continue)
    }

    pub const fn won_by(side: Side) -> Self {
        match side {
            Side::Player => TurnOutcome::PlayerWins,
            Side::Ai => TurnOutcome::AiWins,
        }
    }
}

/// One live entry in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSlot {
    pub id: UnitId,
    pub side: Side,
}

/// Ordered cursor over live units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrder {
    slots: Vec<TurnSlot>,
    cursor: usize,
}

impl TurnOrder {
    /// Builds a rotation positioned at `cursor` (taken modulo the length).
    pub fn new(slots: Vec<TurnSlot>, cursor: usize) -> Self {
        let cursor = if slots.is_empty() { 0 } else { cursor % slots.len() };
        TurnOrder { slots, cursor }
    }

    /// Rebuilds the rotation over `clone`, a copy of `source`.
    ///
    /// Clones carry new unit instances, so units are matched up by walking the
    /// setup `template`, reading each surviving unit's coordinates from
    /// `source`, and checking that the same unit stands there in `clone`. The
    /// cursor is placed one entry before `live_turn_index` so that the first
    /// [`advance`](Self::advance) lands on the live game's current unit.
    pub fn rebind(
        source: &BoardState,
        clone: &BoardState,
        template: &[UnitId],
        live_turn_index: usize,
    ) -> Result<Self> {
        let mut slots = Vec::with_capacity(template.len());
        for &id in template {
            let Some(at) = source.location_of(id) else {
                continue;
            };
            let found = clone.occupant(at)?;
            match found {
                Some(unit) if unit.id == id => slots.push(TurnSlot { id, side: unit.side }),
                _ => {
                    return Err(SimError::CloneDesync {
                        expected: id,
                        at,
                        found: found.map(|u| u.id),
                    })
                }
            }
        }

        let cursor = match slots.len() {
            0 => 0,
            len => (live_turn_index % len + len - 1) % len,
        };
        Ok(TurnOrder { slots, cursor })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[TurnSlot] {
        &self.slots
    }

    /// The unit whose turn it is.
    pub fn active(&self) -> Option<UnitId> {
        self.slots.get(self.cursor).map(|s| s.id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    /// Hands the turn to the next unit, unless the game is already decided.
    pub fn advance(&mut self) -> Result<TurnOutcome> {
        let outcome = self.is_game_over()?;
        if outcome.is_terminal() {
            debug!(?outcome, "game over");
            return Ok(outcome);
        }
        self.cursor = (self.cursor + 1) % self.slots.len();
        trace!(cursor = self.cursor, unit = ?self.active(), "turn advanced");
        Ok(TurnOutcome::Continue)
    }

    /// Drops a dead unit from the rotation.
    ///
    /// Entries before the cursor shift it back by one. Removing the active
    /// entry also steps back (wrapping), so the next advance reaches the unit
    /// that followed it.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<()> {
        let index = self
            .slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(SimError::UnitNotInTurnOrder(id))?;

        self.slots.remove(index);

        if self.slots.is_empty() {
            self.cursor = 0;
        } else if index < self.cursor {
            self.cursor -= 1;
        } else if index == self.cursor {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.slots.len() - 1);
        }
        Ok(())
    }

    /// Checks which sides still have units in the rotation.
    pub fn is_game_over(&self) -> Result<TurnOutcome> {
        let player = self.slots.iter().any(|s| s.side == Side::Player);
        let ai = self.slots.iter().any(|s| s.side == Side::Ai);
        match (player, ai) {
            (true, true) => Ok(TurnOutcome::Continue),
            (true, false) => Ok(TurnOutcome::won_by(Side::Player)),
            (false, true) => Ok(TurnOutcome::won_by(Side::Ai)),
            (false, false) => Err(SimError::NoSidesRemaining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Policy, Unit, UnitStats};

    fn slot(id: usize, side: Side) -> TurnSlot {
        TurnSlot { id: UnitId(id), side }
    }

    /// A, B, C, D alternating sides.
    fn abcd(cursor: usize) -> TurnOrder {
        TurnOrder::new(
            vec![
                slot(0, Side::Ai),
                slot(1, Side::Player),
                slot(2, Side::Ai),
                slot(3, Side::Player),
            ],
            cursor,
        )
    }

    fn ids(order: &TurnOrder) -> Vec<usize> {
        order.slots().iter().map(|s| s.id.0).collect()
    }

    #[test]
    fn removing_earlier_entry_shifts_cursor() {
        let mut order = abcd(2);
        assert_eq!(order.active(), Some(UnitId(2)));
        order.remove_unit(UnitId(0)).unwrap();
        assert_eq!(ids(&order), vec![1, 2, 3]);
        assert_eq!(order.cursor(), 1);
        assert_eq!(order.active(), Some(UnitId(2)));
    }

    #[test]
    fn removing_later_entry_keeps_cursor() {
        let mut order = abcd(1);
        order.remove_unit(UnitId(3)).unwrap();
        assert_eq!(order.cursor(), 1);
        assert_eq!(order.active(), Some(UnitId(1)));
        order.advance().unwrap();
        assert_eq!(order.active(), Some(UnitId(2)));
    }

    #[test]
    fn removing_active_entry_does_not_skip_successor() {
        let mut order = abcd(1);
        order.remove_unit(UnitId(1)).unwrap();
        order.advance().unwrap();
        assert_eq!(order.active(), Some(UnitId(2)));

        let mut first = abcd(0);
        first.remove_unit(UnitId(0)).unwrap();
        first.advance().unwrap();
        assert_eq!(first.active(), Some(UnitId(1)));
    }

    #[test]
    fn removing_unknown_unit_is_an_error() {
        let mut order = abcd(0);
        assert!(matches!(
            order.remove_unit(UnitId(9)),
            Err(SimError::UnitNotInTurnOrder(UnitId(9)))
        ));
    }

    #[test]
    fn advance_wraps_around() {
        let mut order = TurnOrder::new(vec![slot(0, Side::Ai), slot(1, Side::Player)], 1);
        assert_eq!(order.active(), Some(UnitId(1)));
        assert_eq!(order.advance().unwrap(), TurnOutcome::Continue);
        assert_eq!(order.cursor(), 0);
        assert_eq!(order.active(), Some(UnitId(0)));
    }

    #[test]
    fn advance_visits_each_unit_once_per_round() {
        let mut order = abcd(0);
        let mut seen = vec![order.active().unwrap().0];
        for _ in 0..3 {
            order.advance().unwrap();
            seen.push(order.active().unwrap().0);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn advance_does_not_move_when_game_is_over() {
        let mut order = TurnOrder::new(vec![slot(0, Side::Player), slot(1, Side::Player)], 0);
        assert_eq!(order.advance().unwrap(), TurnOutcome::PlayerWins);
        assert_eq!(order.cursor(), 0);
    }

    #[test]
    fn game_over_detection() {
        assert_eq!(abcd(0).is_game_over().unwrap(), TurnOutcome::Continue);

        let ai_only = TurnOrder::new(vec![slot(0, Side::Ai)], 0);
        assert_eq!(ai_only.is_game_over().unwrap(), TurnOutcome::AiWins);
        assert_eq!(TurnOutcome::AiWins.winner(), Some(Side::Ai));

        let player_only = TurnOrder::new(vec![slot(1, Side::Player)], 0);
        assert_eq!(player_only.is_game_over().unwrap(), TurnOutcome::won_by(Side::Player));
        assert_eq!(TurnOutcome::won_by(Side::Player).winner(), Some(Side::Player));

        let empty = TurnOrder::new(Vec::new(), 0);
        assert!(matches!(empty.is_game_over(), Err(SimError::NoSidesRemaining)));
    }

    fn warrior(id: usize, side: Side, row: usize, col: usize) -> Unit {
        Unit::new(
            UnitId(id),
            side,
            Coord::new(row, col),
            UnitStats {
                health: 10,
                damage: 5,
                movement: 1,
                attack_range: 1,
            },
            Policy::free(),
        )
    }

    #[test]
    fn rebind_matches_units_by_coordinates() {
        let mut board = BoardState::new(3, 3).unwrap();
        board.place_unit(warrior(0, Side::Ai, 0, 0)).unwrap();
        board.place_unit(warrior(1, Side::Player, 1, 1)).unwrap();
        board.place_unit(warrior(2, Side::Player, 2, 2)).unwrap();
        let template = [UnitId(0), UnitId(1), UnitId(2)];

        let clone = board.clone();
        let order = TurnOrder::rebind(&board, &clone, &template, 0).unwrap();
        assert_eq!(ids(&order), vec![0, 1, 2]);
        // Positioned one before the live index.
        assert_eq!(order.cursor(), 2);
    }

    #[test]
    fn rebind_skips_dead_units() {
        let mut board = BoardState::new(3, 3).unwrap();
        board.place_unit(warrior(0, Side::Ai, 0, 0)).unwrap();
        board.place_unit(warrior(1, Side::Player, 1, 1)).unwrap();
        board.place_unit(warrior(2, Side::Player, 2, 2)).unwrap();
        board.damage(Coord::new(1, 1), 50).unwrap();
        let template = [UnitId(0), UnitId(1), UnitId(2)];

        let clone = board.clone();
        let order = TurnOrder::rebind(&board, &clone, &template, 1).unwrap();
        assert_eq!(ids(&order), vec![0, 2]);
        assert_eq!(order.cursor(), 0);
    }

    #[test]
    fn rebind_detects_desynchronized_clone() {
        let mut board = BoardState::new(3, 3).unwrap();
        board.place_unit(warrior(0, Side::Ai, 0, 0)).unwrap();
        board.place_unit(warrior(1, Side::Player, 1, 1)).unwrap();
        let mut clone = board.clone();
        clone.move_unit(Coord::new(1, 1), Coord::new(1, 2)).unwrap();

        let err = TurnOrder::rebind(&board, &clone, &[UnitId(0), UnitId(1)], 0).unwrap_err();
        assert!(matches!(
            err,
            SimError::CloneDesync { expected: UnitId(1), found: None, .. }
        ));
    }
}
