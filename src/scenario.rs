//! Game setup input.
//!
//! A scenario describes what the live game hands over at decision time: grid
//! dimensions and, for every unit in turn order, its side, cell, and base
//! attributes. Scenarios load from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{grid_cells, Coord, Facing, Policy, Side, UnitStats};
use crate::error::{Result, SimError};

/// Movement strategy as written in a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PolicySpec {
    #[default]
    Free,
    Directional {
        #[serde(default)]
        strafe: u32,
        /// Initial facing; defaults to toward the far half of the grid.
        #[serde(default)]
        facing: Option<Facing>,
    },
}

/// One unit as handed over by the live game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub side: Side,
    pub row: usize,
    pub col: usize,
    pub health: i32,
    pub damage: i32,
    pub movement: u32,
    pub attack_range: u32,
    /// Side this unit may attack; defaults to the opponent.
    #[serde(default)]
    pub target: Option<Side>,
    #[serde(default)]
    pub policy: PolicySpec,
}

impl UnitSpec {
    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    pub fn stats(&self) -> UnitStats {
        UnitStats {
            health: self.health,
            damage: self.damage,
            movement: self.movement,
            attack_range: self.attack_range,
        }
    }

    /// Resolves the policy for a grid of the given height.
    pub fn policy(&self, height: usize) -> Policy {
        match self.policy {
            PolicySpec::Free => Policy::free(),
            PolicySpec::Directional { strafe, facing } => {
                let facing = facing.unwrap_or(if self.row < height / 2 {
                    Facing::Down
                } else {
                    Facing::Up
                });
                Policy::directional(strafe, facing)
            }
        }
    }
}

/// Grid dimensions plus units in turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub height: usize,
    pub width: usize,
    pub units: Vec<UnitSpec>,
}

impl Scenario {
    /// Loads and validates a scenario from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Scenario> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parses and validates a scenario from a JSON string.
    pub fn from_json(data: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_json::from_str(data)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks dimensions, placements, and unit attributes.
    ///
    /// A scenario needs at least one unit, each with positive health and
    /// non-negative damage, on a grid of at most
    /// [`MAX_CELLS`](crate::board::MAX_CELLS) cells.
    pub fn validate(&self) -> Result<()> {
        let cells = grid_cells(self.height, self.width)?;
        if self.units.is_empty() {
            return Err(SimError::InvalidScenario("scenario has no units".to_string()));
        }
        let mut taken = vec![false; cells];
        for (i, unit) in self.units.iter().enumerate() {
            if unit.row >= self.height || unit.col >= self.width {
                return Err(SimError::InvalidScenario(format!(
                    "unit {} at {} is outside the {}x{} grid",
                    i,
                    unit.coord(),
                    self.height,
                    self.width
                )));
            }
            let idx = unit.row * self.width + unit.col;
            if taken[idx] {
                return Err(SimError::InvalidScenario(format!(
                    "unit {} shares cell {} with an earlier unit",
                    i,
                    unit.coord()
                )));
            }
            taken[idx] = true;
            if unit.health <= 0 {
                return Err(SimError::InvalidScenario(format!(
                    "unit {} starts with non-positive health {}",
                    i, unit.health
                )));
            }
            if unit.damage < 0 {
                return Err(SimError::InvalidScenario(format!(
                    "unit {} has negative damage {}",
                    i, unit.damage
                )));
            }
        }
        Ok(())
    }

    /// A 5x5 skirmish: three ai units along the top row against three player
    /// units along the bottom, one directional unit per side.
    pub fn skirmish() -> Scenario {
        let unit = |side, row, col, policy| UnitSpec {
            side,
            row,
            col,
            health: 12,
            damage: 4,
            movement: 2,
            attack_range: 1,
            target: None,
            policy,
        };
        let lancer = PolicySpec::Directional {
            strafe: 1,
            facing: None,
        };
        Scenario {
            height: 5,
            width: 5,
            units: vec![
                unit(Side::Ai, 0, 0, PolicySpec::Free),
                unit(Side::Player, 4, 4, PolicySpec::Free),
                unit(Side::Ai, 0, 2, lancer),
                unit(Side::Player, 4, 2, lancer),
                unit(Side::Ai, 0, 4, PolicySpec::Free),
                unit(Side::Player, 4, 0, PolicySpec::Free),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skirmish_is_valid() {
        let s = Scenario::skirmish();
        s.validate().unwrap();
        assert_eq!(s.units.len(), 6);
    }

    #[test]
    fn parses_minimal_json_with_defaults() {
        let json = r#"{
            "height": 3,
            "width": 3,
            "units": [
                {"side": "ai", "row": 0, "col": 0, "health": 5, "damage": 10, "movement": 1, "attack_range": 1},
                {"side": "player", "row": 0, "col": 1, "health": 10, "damage": 2, "movement": 1, "attack_range": 1,
                 "policy": {"kind": "directional", "strafe": 2}}
            ]
        }"#;
        let s = Scenario::from_json(json).unwrap();
        assert_eq!(s.units[0].policy, PolicySpec::Free);
        assert_eq!(s.units[0].target, None);
        assert_eq!(
            s.units[1].policy,
            PolicySpec::Directional {
                strafe: 2,
                facing: None
            }
        );
        // Top half defaults to facing down.
        assert_eq!(s.units[1].policy(3).facing(), Some(Facing::Down));
    }

    #[test]
    fn json_roundtrip_preserves_scenario() {
        let s = Scenario::skirmish();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap(), s);
    }

    #[test]
    fn rejects_out_of_bounds_unit() {
        let mut s = Scenario::skirmish();
        s.units[0].row = 9;
        assert!(matches!(s.validate(), Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn rejects_shared_cell() {
        let mut s = Scenario::skirmish();
        s.units[1].row = 0;
        s.units[1].col = 0;
        assert!(matches!(s.validate(), Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn rejects_dead_unit_and_empty_grid() {
        let mut s = Scenario::skirmish();
        s.units[2].health = 0;
        assert!(s.validate().is_err());

        let empty = Scenario {
            height: 0,
            width: 4,
            units: Vec::new(),
        };
        assert!(matches!(empty.validate(), Err(SimError::InvalidDimensions { .. })));
    }

    #[test]
    fn rejects_huge_dimensions_without_panicking() {
        let json = r#"{"height": 4294967296, "width": 4294967296, "units": []}"#;
        assert!(matches!(
            Scenario::from_json(json),
            Err(SimError::InvalidDimensions { .. })
        ));

        let wide = Scenario {
            height: 2,
            width: crate::board::MAX_CELLS,
            units: Vec::new(),
        };
        assert!(matches!(wide.validate(), Err(SimError::InvalidDimensions { .. })));
    }

    #[test]
    fn rejects_scenario_without_units() {
        let s = Scenario::from_json(r#"{"height": 3, "width": 3, "units": []}"#);
        assert!(matches!(s, Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn rejects_negative_damage() {
        let mut s = Scenario::skirmish();
        s.units[3].damage = -2;
        assert!(matches!(s.validate(), Err(SimError::InvalidScenario(_))));

        s.units[3].damage = 0;
        s.validate().unwrap();
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(Scenario::from_json("{"), Err(SimError::Json(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            Scenario::load("/nonexistent/skirmish.json"),
            Err(SimError::Io(_))
        ));
    }
}
