//! The board grid.

use serde::Serialize;

use super::premiums::PremiumLayout;
use super::types::{Cell, Coord, Placement};

/// Square grid of cells.
///
/// The authoritative board belongs to the caller. The pipeline only reads it
/// and builds scratch copies with [`Board::with_placements`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<Cell>>,
    anchors: Vec<Coord>,
}

impl Board {
    /// Empty board carrying the given premium layout.
    pub fn new(layout: &PremiumLayout) -> Self {
        let size = layout.size();
        let cells = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| Cell {
                        premium: layout.premium_at(Coord::new(row, col)),
                        ..Default::default()
                    })
                    .collect()
            })
            .collect();
        Self {
            size,
            cells,
            anchors: layout.anchors().to_vec(),
        }
    }

    /// Empty standard 15x15 board.
    pub fn standard() -> Self {
        Self::new(&PremiumLayout::standard())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// First-move anchor cells.
    pub fn anchors(&self) -> &[Coord] {
        &self.anchors
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(coord.row).and_then(|r| r.get(coord.col))
    }

    pub fn letter_at(&self, coord: Coord) -> Option<char> {
        self.cell(coord).and_then(|c| c.letter)
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.letter_at(coord).is_some()
    }

    /// True when no cell holds a letter.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|c| !c.is_occupied())
    }

    /// Put a letter on a cell. Out-of-range coordinates are ignored.
    pub fn set_letter(&mut self, coord: Coord, letter: char, is_wildcard: bool) {
        if let Some(cell) = self
            .cells
            .get_mut(coord.row)
            .and_then(|r| r.get_mut(coord.col))
        {
            cell.letter = Some(letter);
            cell.is_wildcard = is_wildcard;
        }
    }

    /// Apply placements to this board.
    pub fn place(&mut self, placements: &[Placement]) {
        for p in placements {
            self.set_letter(p.coord(), p.face(), p.is_wildcard());
        }
    }

    /// Scratch copy with `placements` applied; `self` is left untouched.
    pub fn with_placements(&self, placements: &[Placement]) -> Board {
        let mut scratch = self.clone();
        scratch.place(placements);
        scratch
    }

    /// Flag the premium at `coord` as used. Returns true if this call flipped it.
    pub fn consume_premium(&mut self, coord: Coord) -> bool {
        match self
            .cells
            .get_mut(coord.row)
            .and_then(|r| r.get_mut(coord.col))
        {
            Some(cell) if cell.premium.is_some() && !cell.premium_consumed => {
                cell.premium_consumed = true;
                true
            }
            _ => false,
        }
    }

    /// Rows rendered with `.` for empty cells.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.letter.unwrap_or('.')).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Premium;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::standard();
        assert!(board.is_empty());
        assert_eq!(board.size(), 15);
        assert_eq!(board.anchors(), &[Coord::new(7, 7)]);
        assert_eq!(
            board.cell(Coord::new(7, 7)).unwrap().premium,
            Some(Premium::DoubleWord)
        );
    }

    #[test]
    fn test_with_placements_leaves_original_untouched() {
        let board = Board::standard();
        let scratch = board.with_placements(&[
            Placement::new(7, 7, 'H'),
            Placement::wildcard(7, 8, 'I'),
        ]);

        assert!(board.is_empty());
        assert_eq!(scratch.letter_at(Coord::new(7, 7)), Some('H'));
        assert_eq!(scratch.letter_at(Coord::new(7, 8)), Some('I'));
        assert!(scratch.cell(Coord::new(7, 8)).unwrap().is_wildcard);
    }

    #[test]
    fn test_consume_premium_only_once() {
        let mut board = Board::standard();
        assert!(board.consume_premium(Coord::new(7, 7)));
        assert!(!board.consume_premium(Coord::new(7, 7)));
        assert!(!board.consume_premium(Coord::new(7, 8)));
        assert!(!board.consume_premium(Coord::new(40, 40)));
    }

    #[test]
    fn test_rows_render() {
        let board = Board::standard().with_placements(&[Placement::new(0, 0, 'A')]);
        let rows = board.rows();
        assert_eq!(rows.len(), 15);
        assert!(rows[0].starts_with("A..."));
        assert_eq!(rows[1], ".".repeat(15));
    }
}
