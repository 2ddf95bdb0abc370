//! Serialized game state handed to the pipeline by the game-flow layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::board::{Board, Coord, PremiumLayout, Rack};
use crate::text::normalize_letter;

/// Empty-cell sentinel in grid rows.
pub const EMPTY_CELL: char = '.';

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid cell {value:?} at ({row},{col})")]
    InvalidCell { row: usize, col: usize, value: char },

    #[error("Wildcard position ({row},{col}) is off the board")]
    BlankOutOfRange { row: usize, col: usize },

    #[error("Wildcard position ({row},{col}) holds no letter")]
    BlankOnEmptyCell { row: usize, col: usize },

    #[error("Invalid rack: {0}")]
    Rack(String),
}

/// Whose turn the snapshot describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    #[serde(alias = "HUMAN")]
    Human,
    #[default]
    #[serde(alias = "AI")]
    Ai,
}

/// A board cell holding a wildcard tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankCell {
    pub row: usize,
    pub col: usize,
    /// Bound letter. Informational; the grid row already shows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
}

/// Compact, serializable game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// One string per row, one character per cell, `.` for empty.
    pub grid: Vec<String>,
    #[serde(default)]
    pub blanks: Vec<BlankCell>,
    /// Acting player's tiles, `?` for wildcards.
    pub rack: String,
    #[serde(default)]
    pub human_score: u32,
    #[serde(default)]
    pub ai_score: u32,
    #[serde(default)]
    pub turn: Turn,
}

impl StateSnapshot {
    /// Snapshot of an empty board of `size` with the given rack.
    pub fn empty(size: usize, rack: impl Into<String>) -> Self {
        Self {
            grid: vec![EMPTY_CELL.to_string().repeat(size); size],
            blanks: Vec::new(),
            rack: rack.into(),
            human_score: 0,
            ai_score: 0,
            turn: Turn::Ai,
        }
    }

    /// Snapshot of an existing board.
    pub fn from_board(board: &Board, rack: &Rack) -> Self {
        let mut blanks = Vec::new();
        for row in 0..board.size() {
            for col in 0..board.size() {
                if let Some(cell) = board.cell(Coord::new(row, col)) {
                    if cell.is_wildcard {
                        blanks.push(BlankCell {
                            row,
                            col,
                            letter: cell.letter.map(String::from),
                        });
                    }
                }
            }
        }
        Self {
            grid: board.rows(),
            blanks,
            rack: rack.to_string(),
            human_score: 0,
            ai_score: 0,
            turn: Turn::Ai,
        }
    }

    /// Parsed cell letters, row by row. `None` marks an empty cell.
    fn parsed_rows(&self, size: usize) -> Result<Vec<Vec<Option<char>>>, SnapshotError> {
        if self.grid.len() != size {
            return Err(SnapshotError::RowCount {
                expected: size,
                actual: self.grid.len(),
            });
        }

        self.grid
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let chars: Vec<char> = line.nfc().collect();
                if chars.len() != size {
                    return Err(SnapshotError::RowLength {
                        row,
                        expected: size,
                        actual: chars.len(),
                    });
                }
                chars
                    .into_iter()
                    .enumerate()
                    .map(|(col, value)| {
                        if value == EMPTY_CELL {
                            return Ok(None);
                        }
                        normalize_letter(&value.to_string())
                            .filter(|c| c.is_alphabetic())
                            .map(Some)
                            .ok_or(SnapshotError::InvalidCell { row, col, value })
                    })
                    .collect()
            })
            .collect()
    }

    /// Check shape, cell contents, wildcard positions and rack.
    pub fn validate(&self, size: usize) -> Result<(), SnapshotError> {
        let rows = self.parsed_rows(size)?;
        self.check_blanks(&rows, size)?;
        self.rack()?;
        Ok(())
    }

    fn check_blanks(&self, rows: &[Vec<Option<char>>], size: usize) -> Result<(), SnapshotError> {
        for blank in &self.blanks {
            let (row, col) = (blank.row, blank.col);
            if row >= size || col >= size {
                return Err(SnapshotError::BlankOutOfRange { row, col });
            }
            if rows[row][col].is_none() {
                return Err(SnapshotError::BlankOnEmptyCell { row, col });
            }
        }
        Ok(())
    }

    /// Rebuild a board with `layout`'s premiums.
    ///
    /// Premiums under letters already on the board are marked consumed.
    pub fn to_board(&self, layout: &PremiumLayout) -> Result<Board, SnapshotError> {
        let size = layout.size();
        let rows = self.parsed_rows(size)?;
        self.check_blanks(&rows, size)?;

        let mut board = Board::new(layout);
        for (row, cells) in rows.iter().enumerate() {
            for (col, letter) in cells.iter().enumerate() {
                if let Some(letter) = letter {
                    let coord = Coord::new(row, col);
                    let is_wildcard = self.blanks.iter().any(|b| b.row == row && b.col == col);
                    board.set_letter(coord, *letter, is_wildcard);
                    board.consume_premium(coord);
                }
            }
        }
        Ok(board)
    }

    pub fn rack(&self) -> Result<Rack, SnapshotError> {
        Rack::parse(&self.rack).map_err(|e| SnapshotError::Rack(e.to_string()))
    }

    /// Human-readable rendering used in provider prompts.
    pub fn compact_text(&self) -> String {
        let mut out = String::new();
        let width = self.grid.first().map(|r| r.chars().count()).unwrap_or(0);
        let header: String = (0..width).map(|c| format!("{:>3}", c)).collect();
        out.push_str(&format!("   {}\n", header));
        for (i, row) in self.grid.iter().enumerate() {
            let cells: String = row.chars().map(|c| format!("{:>3}", c)).collect();
            out.push_str(&format!("{:>2} {}\n", i, cells));
        }
        if !self.blanks.is_empty() {
            let blanks = self
                .blanks
                .iter()
                .map(|b| format!("{},{}", b.row, b.col))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!("Wildcards on board: {}\n", blanks));
        }
        out.push_str(&format!("Rack: {}\n", self.rack));
        out.push_str(&format!(
            "Scores: human {} / ai {}\n",
            self.human_score, self.ai_score
        ));
        out
    }
}
