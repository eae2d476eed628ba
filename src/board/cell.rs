//! Grid cells and their occupancy markers.
//!
//! A cell owns the unit standing on it. The marker and the unit are kept in
//! lockstep: only `PlayerOccupied`/`AiOccupied` cells carry a unit, and that
//! unit's position always equals the cell's coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::{Side, Unit};

/// A (row, column) position on the grid. Row 0 is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }

    /// Manhattan distance between two coordinates.
    pub const fn distance(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// What a cell currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Empty,
    PlayerOccupied,
    AiOccupied,
    /// Transient mark for a legal destination; cleared between evaluations.
    LegalMoveHighlight,
}

impl Marker {
    /// Returns the single-character form used by the text rendering.
    pub const fn as_char(self) -> char {
        match self {
            Marker::Empty => 'E',
            Marker::PlayerOccupied => 'P',
            Marker::AiOccupied => 'A',
            Marker::LegalMoveHighlight => 'M',
        }
    }

    /// True for the two unit-bearing markers.
    pub const fn is_occupied(self) -> bool {
        matches!(self, Marker::PlayerOccupied | Marker::AiOccupied)
    }

    /// The side a unit-bearing marker belongs to.
    pub const fn side(self) -> Option<Side> {
        match self {
            Marker::PlayerOccupied => Some(Side::Player),
            Marker::AiOccupied => Some(Side::Ai),
            _ => None,
        }
    }
}

/// One grid position.
#[derive(Debug, PartialEq)]
pub struct Cell {
    marker: Marker,
    row: usize,
    col: usize,
    unit: Option<Unit>,
}

impl Cell {
    /// Creates an empty cell at the given coordinates.
    pub fn empty(row: usize, col: usize) -> Self {
        Cell {
            marker: Marker::Empty,
            row,
            col,
            unit: None,
        }
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    /// The unit standing here, if any.
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    pub(crate) fn unit_mut(&mut self) -> Option<&mut Unit> {
        self.unit.as_mut()
    }

    pub fn is_occupied(&self) -> bool {
        self.unit.is_some()
    }

    /// Puts a unit on this cell, taking its side's marker.
    ///
    /// The caller has already checked the cell is free and set the unit's
    /// position to this cell.
    pub(crate) fn put(&mut self, unit: Unit) {
        debug_assert_eq!(unit.position, self.coord());
        self.marker = unit.side.marker();
        self.unit = Some(unit);
    }

    /// Removes and returns the unit, leaving the cell empty.
    pub(crate) fn take(&mut self) -> Option<Unit> {
        let unit = self.unit.take();
        if unit.is_some() {
            self.marker = Marker::Empty;
        }
        unit
    }

    /// Marks an empty cell as a legal destination. Returns false for occupied cells.
    pub(crate) fn highlight(&mut self) -> bool {
        if self.is_occupied() {
            return false;
        }
        self.marker = Marker::LegalMoveHighlight;
        true
    }

    /// Resets a highlight back to empty.
    pub(crate) fn clear_highlight(&mut self) {
        if self.marker == Marker::LegalMoveHighlight {
            self.marker = Marker::Empty;
        }
    }

    /// Allocates a new cell with the same marker and a copied unit owned by it.
    pub(crate) fn duplicate(&self) -> Cell {
        let coord = self.coord();
        Cell {
            marker: self.marker,
            row: self.row,
            col: self.col,
            unit: self.unit.as_ref().map(|u| u.copy_to(coord)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::unit::{Side, UnitId, UnitStats};
    use crate::board::Policy;

    fn warrior(side: Side, at: Coord) -> Unit {
        Unit::new(
            UnitId(0),
            side,
            at,
            UnitStats {
                health: 10,
                damage: 3,
                movement: 2,
                attack_range: 1,
            },
            Policy::free(),
        )
    }

    #[test]
    fn marker_chars_are_distinct() {
        let chars: Vec<char> = [
            Marker::Empty,
            Marker::PlayerOccupied,
            Marker::AiOccupied,
            Marker::LegalMoveHighlight,
        ]
        .iter()
        .map(|m| m.as_char())
        .collect();
        assert_eq!(chars, vec!['E', 'P', 'A', 'M']);
    }

    #[test]
    fn put_and_take_keep_marker_in_sync() {
        let mut cell = Cell::empty(1, 2);
        cell.put(warrior(Side::Ai, Coord::new(1, 2)));
        assert_eq!(cell.marker(), Marker::AiOccupied);
        assert!(cell.is_occupied());

        let unit = cell.take().unwrap();
        assert_eq!(unit.side, Side::Ai);
        assert_eq!(cell.marker(), Marker::Empty);
        assert!(cell.unit().is_none());
    }

    #[test]
    fn highlight_skips_occupied_cells() {
        let mut free = Cell::empty(0, 0);
        assert!(free.highlight());
        assert_eq!(free.marker(), Marker::LegalMoveHighlight);
        free.clear_highlight();
        assert_eq!(free.marker(), Marker::Empty);

        let mut taken = Cell::empty(0, 1);
        taken.put(warrior(Side::Player, Coord::new(0, 1)));
        assert!(!taken.highlight());
        assert_eq!(taken.marker(), Marker::PlayerOccupied);
    }

    #[test]
    fn duplicate_copies_unit_at_same_coords() {
        let mut cell = Cell::empty(2, 0);
        cell.put(warrior(Side::Player, Coord::new(2, 0)));
        let copy = cell.duplicate();
        assert_eq!(copy, cell);
        assert_eq!(copy.unit().unwrap().position, Coord::new(2, 0));
    }

    #[test]
    fn distance_is_manhattan() {
        assert_eq!(Coord::new(0, 0).distance(Coord::new(2, 3)), 5);
        assert_eq!(Coord::new(4, 1).distance(Coord::new(1, 1)), 3);
    }
}
