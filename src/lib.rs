//! Skirmish simulation core.
//!
//! A grid of cells holding units from two sides, a round-robin turn order over
//! the living units, and cheap isolated copies of the whole state so a tree
//! search can explore moves without touching the live game.

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod scenario;
pub mod search;
pub mod selfplay;
pub mod turn;

pub use error::{Result, SimError};
pub use game::GameState;
pub use turn::TurnOutcome;
