//! Actions a unit can take on its turn.
//!
//! Every turn is a move (possibly onto the unit's own cell) optionally
//! followed by a strike at one cell. Search adapters treat actions as opaque
//! tree edges.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::Coord;
use super::unit::UnitId;

/// One unit's turn: move to `move_to`, then strike `target` if present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub unit: UnitId,
    pub move_to: Coord,
    pub target: Option<Coord>,
}

impl Action {
    /// A plain move with no attack.
    pub fn step(unit: UnitId, move_to: Coord) -> Self {
        Action {
            unit,
            move_to,
            target: None,
        }
    }

    /// Move to `move_to` and strike `target`.
    pub fn strike(unit: UnitId, move_to: Coord, target: Coord) -> Self {
        Action {
            unit,
            move_to,
            target: Some(target),
        }
    }

    pub fn is_attack(&self) -> bool {
        self.target.is_some()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.unit, self.move_to)?;
        if let Some(target) = self.target {
            write!(f, " x {}", target)?;
        }
        Ok(())
    }
}
