//! Board value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::BoardError;

/// Side length of the standard board.
pub const BOARD_SIZE: usize = 15;

/// Marker for a wildcard tile on a rack or in a placement.
pub const WILDCARD: char = '?';

/// A board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbour one step along `axis`, `forward` towards higher indices.
    /// Returns `None` when the step would leave a board of `size` cells.
    pub fn step(self, axis: Axis, forward: bool, size: usize) -> Option<Coord> {
        let (row, col) = match (axis, forward) {
            (Axis::Across, true) => (self.row, self.col.checked_add(1)?),
            (Axis::Across, false) => (self.row, self.col.checked_sub(1)?),
            (Axis::Down, true) => (self.row.checked_add(1)?, self.col),
            (Axis::Down, false) => (self.row.checked_sub(1)?, self.col),
        };
        (row < size && col < size).then_some(Coord { row, col })
    }

    /// The four orthogonal neighbours that lie on the board.
    pub fn neighbours(self, size: usize) -> impl Iterator<Item = Coord> {
        [
            self.step(Axis::Down, false, size),
            self.step(Axis::Down, true, size),
            self.step(Axis::Across, false, size),
            self.step(Axis::Across, true, size),
        ]
        .into_iter()
        .flatten()
    }

    /// Position of this coordinate along `axis`.
    pub fn along(self, axis: Axis) -> usize {
        match axis {
            Axis::Across => self.col,
            Axis::Down => self.row,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Direction a line of tiles runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Row-aligned.
    Across,
    /// Column-aligned.
    Down,
}

impl Axis {
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Across => Axis::Down,
            Axis::Down => Axis::Across,
        }
    }
}

/// Premium square kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Premium {
    #[serde(rename = "DL")]
    DoubleLetter,
    #[serde(rename = "TL")]
    TripleLetter,
    #[serde(rename = "DW")]
    DoubleWord,
    #[serde(rename = "TW")]
    TripleWord,
}

impl Premium {
    pub fn letter_multiplier(self) -> u32 {
        match self {
            Premium::DoubleLetter => 2,
            Premium::TripleLetter => 3,
            _ => 1,
        }
    }

    pub fn word_multiplier(self) -> u32 {
        match self {
            Premium::DoubleWord => 2,
            Premium::TripleWord => 3,
            _ => 1,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Premium::DoubleLetter => "DL",
            Premium::TripleLetter => "TL",
            Premium::DoubleWord => "DW",
            Premium::TripleWord => "TW",
        }
    }
}

impl fmt::Display for Premium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Premium {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DL" => Ok(Premium::DoubleLetter),
            "TL" => Ok(Premium::TripleLetter),
            "DW" => Ok(Premium::DoubleWord),
            "TW" => Ok(Premium::TripleWord),
            other => Err(BoardError::UnknownPremium(other.to_string())),
        }
    }
}

/// One square of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Letter shown on the square. For wildcard tiles this is the bound letter.
    pub letter: Option<char>,
    pub premium: Option<Premium>,
    /// Set once a committed move has used the premium. Never cleared.
    pub premium_consumed: bool,
    /// The occupying tile is a wildcard bound to `letter`.
    pub is_wildcard: bool,
}

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.letter.is_some()
    }

    /// Premium that still counts for scoring.
    pub fn active_premium(&self) -> Option<Premium> {
        if self.premium_consumed {
            None
        } else {
            self.premium
        }
    }
}

/// A single tile a move puts on the board.
///
/// `letter` is either a real letter or [`WILDCARD`]; a wildcard carries the
/// letter it stands for in `binding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
    pub letter: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<char>,
}

impl Placement {
    pub fn new(row: usize, col: usize, letter: char) -> Self {
        Self {
            row,
            col,
            letter,
            binding: None,
        }
    }

    pub fn wildcard(row: usize, col: usize, binding: char) -> Self {
        Self {
            row,
            col,
            letter: WILDCARD,
            binding: Some(binding),
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    pub fn is_wildcard(&self) -> bool {
        self.letter == WILDCARD
    }

    /// Letter this tile reads as on the board.
    pub fn face(&self) -> char {
        if self.is_wildcard() {
            self.binding.unwrap_or(WILDCARD)
        } else {
            self.letter
        }
    }
}
