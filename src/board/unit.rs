//! Units, sides, and combat attributes.
//!
//! A unit is owned by the cell it stands on and records that cell as a
//! coordinate rather than a reference. Movement and attack geometry live in
//! the unit's [`Policy`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::{Coord, Marker};
use super::policy::{MovementPolicy, Policy};

/// Which side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    /// Returns the other side.
    pub const fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// The cell marker a unit of this side shows.
    pub const fn marker(self) -> Marker {
        match self {
            Side::Player => Marker::PlayerOccupied,
            Side::Ai => Marker::AiOccupied,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Ai => "ai",
        }
    }
}

/// A unit's fixed turn-order slot, assigned at setup and preserved by clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Base attributes copied from the live game when a unit is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub health: i32,
    pub damage: i32,
    pub movement: u32,
    pub attack_range: u32,
}

/// Whether a unit survived a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    Dead,
}

/// A combat unit on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub side: Side,
    /// Coordinates of the owning cell.
    pub position: Coord,
    pub health: i32,
    pub damage: i32,
    /// Movement range in steps.
    pub movement: u32,
    pub attack_range: u32,
    /// The side this unit may attack.
    pub target: Side,
    pub policy: Policy,
}

impl Unit {
    /// Creates a unit targeting the opposing side.
    pub fn new(id: UnitId, side: Side, position: Coord, stats: UnitStats, policy: Policy) -> Self {
        Unit {
            id,
            side,
            position,
            health: stats.health,
            damage: stats.damage,
            movement: stats.movement,
            attack_range: stats.attack_range,
            target: side.opponent(),
            policy,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether a cell showing `marker` holds something this unit may attack.
    pub fn can_target(&self, marker: Marker) -> bool {
        marker == self.target.marker()
    }

    /// Subtracts `amount` from health and reports whether the unit survived.
    ///
    /// Removing a dead unit from the board and turn order is the caller's job;
    /// see [`GameState::damage_unit`](crate::game::GameState::damage_unit).
    pub fn take_damage(&mut self, amount: i32) -> Vitality {
        self.health -= amount;
        if self.health <= 0 {
            Vitality::Dead
        } else {
            Vitality::Alive
        }
    }

    /// Returns an independent copy of this unit owned by the cell at `at`.
    pub fn copy_to(&self, at: Coord) -> Unit {
        Unit {
            position: at,
            ..self.clone()
        }
    }

    /// Updates the position after a move and lets the policy react to it.
    pub(crate) fn relocate(&mut self, to: Coord, height: usize) {
        self.position = to;
        self.policy.reorient(to.row, height);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}: health {}, damage {}, movement {}, attack range {}, targets {}, {}",
            self.side.name(),
            self.id,
            self.position,
            self.health,
            self.damage,
            self.movement,
            self.attack_range,
            self.target.name(),
            self.policy,
        )
    }
}
