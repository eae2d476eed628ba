//! Board state: the cell grid and the turn-slot location table.
//!
//! Cells own their units. The slot table maps each unit's turn-order slot to
//! the cell currently holding it so a unit can be found without scanning the
//! grid. Both are updated together by every mutation in this module.

use std::fmt;

use tracing::trace;

use super::cell::{Cell, Coord, Marker};
use super::policy::MovementPolicy;
use super::unit::{Unit, UnitId, Vitality};
use crate::error::{Result, SimError};

/// Outcome of applying damage to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    Wounded { target: UnitId, health: i32 },
    /// The unit died and has been removed from the board.
    Killed { target: UnitId },
}

/// A fixed-size grid of cells plus the per-slot location table.
#[derive(Debug, PartialEq)]
pub struct BoardState {
    height: usize,
    width: usize,
    /// Row-major.
    cells: Vec<Cell>,
    /// Indexed by `UnitId`; `None` once the unit died.
    slots: Vec<Option<Coord>>,
}

/// Largest grid a board will allocate.
pub const MAX_CELLS: usize = 1 << 20;

/// Cell count of a `height` x `width` grid, rejecting empty, overflowing, or
/// oversized dimensions.
pub fn grid_cells(height: usize, width: usize) -> Result<usize> {
    match height.checked_mul(width) {
        Some(cells) if cells > 0 && cells <= MAX_CELLS => Ok(cells),
        _ => Err(SimError::InvalidDimensions { height, width }),
    }
}

impl BoardState {
    /// Creates an empty board. Both dimensions must be non-zero and the grid
    /// no larger than [`MAX_CELLS`].
    pub fn new(height: usize, width: usize) -> Result<Self> {
        grid_cells(height, width)?;
        let cells = (0..height)
            .flat_map(|row| (0..width).map(move |col| Cell::empty(row, col)))
            .collect();
        Ok(BoardState {
            height,
            width,
            cells,
            slots: Vec::new(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.height && at.col < self.width
    }

    fn index(&self, at: Coord) -> Result<usize> {
        if !self.contains(at) {
            return Err(SimError::OutOfBounds {
                row: at.row,
                col: at.col,
                height: self.height,
                width: self.width,
            });
        }
        Ok(at.row * self.width + at.col)
    }

    /// Bounds-checked cell lookup.
    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Cell> {
        self.cell(Coord::new(row, col))
    }

    pub fn cell(&self, at: Coord) -> Result<&Cell> {
        let idx = self.index(at)?;
        Ok(&self.cells[idx])
    }

    fn cell_mut(&mut self, at: Coord) -> Result<&mut Cell> {
        let idx = self.index(at)?;
        Ok(&mut self.cells[idx])
    }

    /// The unit occupying a cell, if any.
    pub fn occupant_at(&self, row: usize, col: usize) -> Result<Option<&Unit>> {
        self.occupant(Coord::new(row, col))
    }

    pub fn occupant(&self, at: Coord) -> Result<Option<&Unit>> {
        Ok(self.cell(at)?.unit())
    }

    /// True if `at` is on the grid and holds no unit.
    pub fn is_free(&self, at: Coord) -> bool {
        self.cell(at).map(|c| !c.is_occupied()).unwrap_or(false)
    }

    /// Orthogonal neighbours of `at` that lie on the grid.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        let up = at.row.checked_sub(1).map(|r| Coord::new(r, at.col));
        let down = Some(Coord::new(at.row + 1, at.col));
        let left = at.col.checked_sub(1).map(|c| Coord::new(at.row, c));
        let right = Some(Coord::new(at.row, at.col + 1));
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |c| self.contains(*c))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Places a unit on its recorded position and registers its slot.
    ///
    /// The unit's policy is oriented for its row, as after a move.
    pub fn place_unit(&mut self, mut unit: Unit) -> Result<()> {
        let at = unit.position;
        let id = unit.id;
        if self.cell(at)?.is_occupied() {
            return Err(SimError::Occupied(at));
        }
        if self.slots.get(id.0).is_some_and(|s| s.is_some()) {
            return Err(SimError::BrokenInvariant {
                at,
                reason: "unit id already placed",
            });
        }
        if self.slots.len() <= id.0 {
            self.slots.resize(id.0 + 1, None);
        }
        unit.policy.reorient(at.row, self.height);
        self.cell_mut(at)?.put(unit);
        self.slots[id.0] = Some(at);
        Ok(())
    }

    /// Where the unit in slot `id` currently stands, or None if it died.
    pub fn location_of(&self, id: UnitId) -> Option<Coord> {
        self.slots.get(id.0).copied().flatten()
    }

    /// Looks up a live unit by slot.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        let at = self.location_of(id)?;
        self.cell(at).ok()?.unit()
    }

    /// Live units in slot order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.slots
            .iter()
            .flatten()
            .filter_map(|at| self.cell(*at).ok().and_then(Cell::unit))
    }

    /// Moves the unit at `from` onto `to`.
    ///
    /// Moving onto the current cell is a no-op. The destination must be free;
    /// range checks belong to the caller.
    pub fn move_unit(&mut self, from: Coord, to: Coord) -> Result<()> {
        if self.cell(from)?.unit().is_none() {
            return Err(SimError::NoUnit(from));
        }
        if from == to {
            return Ok(());
        }
        if self.cell(to)?.is_occupied() {
            return Err(SimError::Occupied(to));
        }

        let height = self.height;
        let mut unit = self.cell_mut(from)?.take().ok_or(SimError::NoUnit(from))?;
        unit.relocate(to, height);
        let id = unit.id;
        self.cell_mut(to)?.put(unit);
        self.slots[id.0] = Some(to);
        trace!(unit = %id, %from, %to, "unit moved");
        Ok(())
    }

    /// Applies `amount` damage to the unit at `at`, removing it if it dies.
    ///
    /// Only updates the board; turn-order removal happens in
    /// [`GameState::damage_unit`](crate::game::GameState::damage_unit).
    pub fn damage(&mut self, at: Coord, amount: i32) -> Result<Damage> {
        let cell = self.cell_mut(at)?;
        let unit = cell.unit_mut().ok_or(SimError::NoUnit(at))?;
        let target = unit.id;
        match unit.take_damage(amount) {
            Vitality::Alive => Ok(Damage::Wounded {
                target,
                health: unit.health,
            }),
            Vitality::Dead => {
                cell.take();
                self.slots[target.0] = None;
                Ok(Damage::Killed { target })
            }
        }
    }

    /// Marks free cells as legal destinations. Occupied cells are skipped.
    pub fn highlight(&mut self, cells: &[Coord]) -> Result<usize> {
        let mut marked = 0;
        for &at in cells {
            if self.cell_mut(at)?.highlight() {
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Resets every highlighted cell to empty.
    pub fn clear_transient_marks(&mut self) {
        for cell in &mut self.cells {
            cell.clear_highlight();
        }
    }

    /// Verifies that markers, units, and the slot table agree.
    pub fn check_invariants(&self) -> Result<()> {
        for cell in &self.cells {
            let at = cell.coord();
            match (cell.marker(), cell.unit()) {
                (Marker::Empty | Marker::LegalMoveHighlight, None) => {}
                (Marker::Empty | Marker::LegalMoveHighlight, Some(_)) => {
                    return Err(SimError::BrokenInvariant {
                        at,
                        reason: "unit on an unoccupied marker",
                    });
                }
                (_, None) => {
                    return Err(SimError::BrokenInvariant {
                        at,
                        reason: "occupied marker without a unit",
                    });
                }
                (marker, Some(unit)) => {
                    if unit.position != at {
                        return Err(SimError::BrokenInvariant {
                            at,
                            reason: "unit position differs from its cell",
                        });
                    }
                    if marker != unit.side.marker() {
                        return Err(SimError::BrokenInvariant {
                            at,
                            reason: "marker does not match unit side",
                        });
                    }
                    if self.location_of(unit.id) != Some(at) {
                        return Err(SimError::BrokenInvariant {
                            at,
                            reason: "slot table does not point at this cell",
                        });
                    }
                }
            }
        }
        for (slot, at) in self.slots.iter().enumerate() {
            if let Some(at) = *at {
                if self.occupant(at)?.map(|u| u.id) != Some(UnitId(slot)) {
                    return Err(SimError::BrokenInvariant {
                        at,
                        reason: "slot points at a cell without its unit",
                    });
                }
            }
        }
        Ok(())
    }
}

impl Clone for BoardState {
    /// Allocates fresh cells; each occupied cell gets its own copy of the unit.
    fn clone(&self) -> Self {
        BoardState {
            height: self.height,
            width: self.width,
            cells: self.cells.iter().map(Cell::duplicate).collect(),
            slots: self.slots.clone(),
        }
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: Vec<String> = row.iter().map(|c| c.marker().as_char().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
