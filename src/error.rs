//! Error type shared by the board, turn order, and scenario loader.
//!
//! Illegal actions are not errors: they come back as
//! [`Resolution::Rejected`](crate::game::Resolution). Everything here is either
//! a broken invariant or bad input, and callers are expected to stop.

use crate::board::{Coord, UnitId};

/// Errors raised by the simulation core.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("coordinate ({row}, {col}) is outside the {height}x{width} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    #[error("grid dimensions {height}x{width} are empty or too large")]
    InvalidDimensions { height: usize, width: usize },

    #[error("cell {0} is already occupied")]
    Occupied(Coord),

    #[error("no unit at {0}")]
    NoUnit(Coord),

    #[error("unit {0} has no slot in the turn order")]
    UnitNotInTurnOrder(UnitId),

    #[error("turn order holds no live unit of either side")]
    NoSidesRemaining,

    #[error("clone is out of sync: expected unit {expected} at {at}, found {found:?}")]
    CloneDesync {
        expected: UnitId,
        at: Coord,
        found: Option<UnitId>,
    },

    #[error("board invariant broken at {at}: {reason}")]
    BrokenInvariant { at: Coord, reason: &'static str },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build rollout thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;
