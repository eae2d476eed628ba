//! Board representation.
//!
//! Cells, units, movement policies, actions, and the grid that ties them
//! together.

pub mod action;
pub mod cell;
pub mod policy;
pub mod state;
pub mod unit;

pub use action::Action;
pub use cell::{Cell, Coord, Marker};
pub use policy::{DirectionalMovement, Facing, FreeMovement, MovementPolicy, Policy};
pub use state::{grid_cells, BoardState, Damage, MAX_CELLS};
pub use unit::{Side, Unit, UnitId, UnitStats, Vitality};
