//! Movement and attack geometry.
//!
//! Units share one action set (move, attack, take damage, copy) and differ
//! only in how far and in which directions they may move and strike. That
//! difference is a strategy: [`FreeMovement`] reaches any cell within its
//! step budget, [`DirectionalMovement`] advances along a facing that flips at
//! the top and bottom rows.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::Coord;
use super::state::BoardState;
use super::unit::Unit;

/// Vertical facing of a directional unit. `Up` decreases the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
}

impl Facing {
    /// Returns the row `steps` rows ahead, or None past the grid edge.
    pub fn step(self, row: usize, steps: usize, height: usize) -> Option<usize> {
        match self {
            Facing::Up => row.checked_sub(steps),
            Facing::Down => row.checked_add(steps).filter(|&r| r < height),
        }
    }

    /// The facing a unit takes on after arriving at `row`.
    ///
    /// The last row turns it up, row 0 turns it down, anything in between
    /// keeps the current facing.
    pub fn at_row(self, row: usize, height: usize) -> Facing {
        if row + 1 == height {
            Facing::Up
        } else if row == 0 {
            Facing::Down
        } else {
            self
        }
    }
}

/// Geometry every movement strategy provides.
pub trait MovementPolicy {
    /// Cells the unit may end its move on, starting with its own position.
    fn destinations(&self, unit: &Unit, board: &BoardState) -> Vec<Coord>;

    /// Cells the unit could strike after moving to `from`.
    fn attack_cells(&self, unit: &Unit, from: Coord, board: &BoardState) -> Vec<Coord>;

    /// Called after the unit moves onto `row`.
    fn reorient(&mut self, row: usize, height: usize);
}

/// Moves orthogonally up to `movement` steps around other units; strikes
/// anything within Manhattan distance `attack_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreeMovement;

impl MovementPolicy for FreeMovement {
    fn destinations(&self, unit: &Unit, board: &BoardState) -> Vec<Coord> {
        let width = board.width();
        let mut seen = vec![false; board.height() * width];
        let mut queue = VecDeque::new();
        let mut out = Vec::new();

        seen[unit.position.row * width + unit.position.col] = true;
        queue.push_back((unit.position, 0u32));

        while let Some((at, dist)) = queue.pop_front() {
            out.push(at);
            if dist == unit.movement {
                continue;
            }
            for next in board.neighbors(at) {
                let idx = next.row * width + next.col;
                if seen[idx] || !board.is_free(next) {
                    continue;
                }
                seen[idx] = true;
                queue.push_back((next, dist + 1));
            }
        }

        out
    }

    fn attack_cells(&self, unit: &Unit, from: Coord, board: &BoardState) -> Vec<Coord> {
        let range = unit.attack_range as usize;
        let mut out = Vec::new();
        let rows = from.row.saturating_sub(range)..=(from.row + range).min(board.height() - 1);
        for row in rows {
            let rest = range - row.abs_diff(from.row);
            let cols = from.col.saturating_sub(rest)..=(from.col + rest).min(board.width() - 1);
            for col in cols {
                let cell = Coord::new(row, col);
                if cell != from {
                    out.push(cell);
                }
            }
        }
        out
    }

    fn reorient(&mut self, _row: usize, _height: usize) {}
}

/// Advances up to `movement` rows along its facing or strafes up to `strafe`
/// columns sideways; strikes straight ahead up to `attack_range` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalMovement {
    pub strafe: u32,
    pub facing: Facing,
}

impl MovementPolicy for DirectionalMovement {
    fn destinations(&self, unit: &Unit, board: &BoardState) -> Vec<Coord> {
        let start = unit.position;
        let mut out = vec![start];

        for steps in 1..=unit.movement as usize {
            let Some(row) = self.facing.step(start.row, steps, board.height()) else {
                break;
            };
            let next = Coord::new(row, start.col);
            if !board.is_free(next) {
                break;
            }
            out.push(next);
        }

        for steps in 1..=self.strafe as usize {
            let Some(col) = start.col.checked_sub(steps) else {
                break;
            };
            let next = Coord::new(start.row, col);
            if !board.is_free(next) {
                break;
            }
            out.push(next);
        }

        for steps in 1..=self.strafe as usize {
            let col = start.col + steps;
            if col >= board.width() {
                break;
            }
            let next = Coord::new(start.row, col);
            if !board.is_free(next) {
                break;
            }
            out.push(next);
        }

        out
    }

    fn attack_cells(&self, unit: &Unit, from: Coord, board: &BoardState) -> Vec<Coord> {
        // Attacks use the facing the unit will have once it stands on `from`.
        let facing = self.facing.at_row(from.row, board.height());
        (1..=unit.attack_range as usize)
            .map_while(|steps| facing.step(from.row, steps, board.height()))
            .map(|row| Coord::new(row, from.col))
            .collect()
    }

    fn reorient(&mut self, row: usize, height: usize) {
        self.facing = self.facing.at_row(row, height);
    }
}

/// The movement strategy a unit carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Free(FreeMovement),
    Directional(DirectionalMovement),
}

impl Policy {
    pub const fn free() -> Self {
        Policy::Free(FreeMovement)
    }

    pub const fn directional(strafe: u32, facing: Facing) -> Self {
        Policy::Directional(DirectionalMovement { strafe, facing })
    }

    /// Current facing for directional units.
    pub fn facing(&self) -> Option<Facing> {
        match self {
            Policy::Free(_) => None,
            Policy::Directional(d) => Some(d.facing),
        }
    }
}

impl MovementPolicy for Policy {
    fn destinations(&self, unit: &Unit, board: &BoardState) -> Vec<Coord> {
        match self {
            Policy::Free(p) => p.destinations(unit, board),
            Policy::Directional(p) => p.destinations(unit, board),
        }
    }

    fn attack_cells(&self, unit: &Unit, from: Coord, board: &BoardState) -> Vec<Coord> {
        match self {
            Policy::Free(p) => p.attack_cells(unit, from, board),
            Policy::Directional(p) => p.attack_cells(unit, from, board),
        }
    }

    fn reorient(&mut self, row: usize, height: usize) {
        match self {
            Policy::Free(p) => p.reorient(row, height),
            Policy::Directional(p) => p.reorient(row, height),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Free(_) => write!(f, "free"),
            Policy::Directional(d) => write!(f, "directional (strafe {}, facing {:?})", d.strafe, d.facing),
        }
    }
}
