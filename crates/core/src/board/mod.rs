//! Board model: grid, premium layouts, tile sets and racks.

mod grid;
mod premiums;
mod rack;
mod tiles;
mod types;

pub use grid::Board;
pub use premiums::PremiumLayout;
pub use rack::Rack;
pub use tiles::{TileSet, TileSpec};
pub use types::{Axis, Cell, Coord, Placement, Premium, BOARD_SIZE, WILDCARD};

use thiserror::Error;

/// Errors from building boards, layouts and tile sets.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Invalid row count: {0}")]
    InvalidRowCount(usize),

    #[error("Invalid row length: {0}")]
    InvalidRowLength(usize),

    #[error("Unknown premium tag: {0}")]
    UnknownPremium(String),

    #[error("Invalid letter: {0}")]
    InvalidLetter(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}
