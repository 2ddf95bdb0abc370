//! Placement legality checks.
//!
//! Every check is a pure function over the board as it was before the move
//! and the proposed placements. [`check_placements`] runs them in a fixed
//! order and stops at the first violation.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::board::{Axis, Board, Coord, Placement, Rack, WILDCARD};

/// Why a set of placements is illegal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("no placements")]
    NoPlacements,

    #[error("out_of_bounds: {0}")]
    OutOfBounds(Coord),

    #[error("first_move_must_cover_center")]
    CenterNotCovered,

    #[error("not_in_single_line")]
    NoLine,

    #[error("gap_in_line: {0}")]
    Gap(Coord),

    #[error("not_connected")]
    NotConnected,

    #[error("cell_occupied: {0}")]
    CellOccupied(Coord),

    #[error("duplicate_cell: {0}")]
    DuplicateCell(Coord),

    #[error("wildcard_unbound: {0}")]
    WildcardUnbound(Coord),

    #[error("rack_missing_tile: {0}")]
    RackMissingTile(char),

    #[error("no_word_formed")]
    NoWordFormed,
}

impl RuleViolation {
    /// Stable machine-readable code without the detail suffix.
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::NoPlacements => "no_placements",
            RuleViolation::OutOfBounds(_) => "out_of_bounds",
            RuleViolation::CenterNotCovered => "first_move_must_cover_center",
            RuleViolation::NoLine => "not_in_single_line",
            RuleViolation::Gap(_) => "gap_in_line",
            RuleViolation::NotConnected => "not_connected",
            RuleViolation::CellOccupied(_) => "cell_occupied",
            RuleViolation::DuplicateCell(_) => "duplicate_cell",
            RuleViolation::WildcardUnbound(_) => "wildcard_unbound",
            RuleViolation::RackMissingTile(_) => "rack_missing_tile",
            RuleViolation::NoWordFormed => "no_word_formed",
        }
    }
}

/// True iff exactly one first-move anchor is covered by a new placement.
pub fn covers_center(board: &Board, placements: &[Placement]) -> bool {
    board
        .anchors()
        .iter()
        .filter(|anchor| placements.iter().any(|p| p.coord() == **anchor))
        .count()
        == 1
}

/// Axis shared by all placements, or `None` for scattered or empty sets.
///
/// A single tile lies on both axes; `Across` is reported.
pub fn in_single_line(placements: &[Placement]) -> Option<Axis> {
    let first = placements.first()?;
    if placements.iter().all(|p| p.row == first.row) {
        Some(Axis::Across)
    } else if placements.iter().all(|p| p.col == first.col) {
        Some(Axis::Down)
    } else {
        None
    }
}

/// Every cell between the outermost placements along `axis` must be filled,
/// either by an existing letter or by another placement.
pub fn no_gaps_along_line(
    board: &Board,
    placements: &[Placement],
    axis: Axis,
) -> Result<(), RuleViolation> {
    let Some(first) = placements.first() else {
        return Err(RuleViolation::NoPlacements);
    };
    let positions: HashSet<usize> = placements.iter().map(|p| p.coord().along(axis)).collect();
    let (Some(&lo), Some(&hi)) = (positions.iter().min(), positions.iter().max()) else {
        return Err(RuleViolation::NoPlacements);
    };

    for pos in lo..=hi {
        let coord = match axis {
            Axis::Across => Coord::new(first.row, pos),
            Axis::Down => Coord::new(pos, first.col),
        };
        if !positions.contains(&pos) && !board.is_occupied(coord) {
            return Err(RuleViolation::Gap(coord));
        }
    }
    Ok(())
}

/// True iff some placement touches (4-connectivity) a letter already on the board.
pub fn connects_to_existing(board: &Board, placements: &[Placement]) -> bool {
    placements.iter().any(|p| {
        p.coord()
            .neighbours(board.size())
            .any(|n| board.is_occupied(n))
    })
}

/// The rack must hold a tile for every placement: the literal letter, or a
/// wildcard for bound wildcard placements. Occupied and repeated cells are
/// rejected outright.
pub fn rack_satisfies(
    board: &Board,
    rack: &Rack,
    placements: &[Placement],
) -> Result<(), RuleViolation> {
    let mut seen = HashSet::new();
    let mut needed: HashMap<char, usize> = HashMap::new();

    for p in placements {
        let coord = p.coord();
        if board.is_occupied(coord) {
            return Err(RuleViolation::CellOccupied(coord));
        }
        if !seen.insert(coord) {
            return Err(RuleViolation::DuplicateCell(coord));
        }
        if p.is_wildcard() && p.binding.is_none() {
            return Err(RuleViolation::WildcardUnbound(coord));
        }
        let tile = if p.is_wildcard() { WILDCARD } else { p.letter };
        *needed.entry(tile).or_insert(0) += 1;
    }

    let available = rack.counts();
    // Sorted so the reported tile does not depend on hash order.
    let mut needed: Vec<_> = needed.into_iter().collect();
    needed.sort_unstable();
    for (tile, count) in needed {
        if available.get(&tile).copied().unwrap_or(0) < count {
            return Err(RuleViolation::RackMissingTile(tile));
        }
    }
    Ok(())
}

/// Run every legality check in order, returning the move's axis.
///
/// Order: bounds, center cover (empty board only), single line, gaps,
/// connectivity (non-empty board only), rack.
pub fn check_placements(
    board: &Board,
    rack: &Rack,
    placements: &[Placement],
) -> Result<Axis, RuleViolation> {
    if placements.is_empty() {
        return Err(RuleViolation::NoPlacements);
    }
    if let Some(p) = placements.iter().find(|p| !board.in_bounds(p.row, p.col)) {
        return Err(RuleViolation::OutOfBounds(p.coord()));
    }

    let first_move = board.is_empty();
    if first_move && !covers_center(board, placements) {
        return Err(RuleViolation::CenterNotCovered);
    }

    let axis = in_single_line(placements).ok_or(RuleViolation::NoLine)?;
    no_gaps_along_line(board, placements, axis)?;

    if !first_move && !connects_to_existing(board, placements) {
        return Err(RuleViolation::NotConnected);
    }

    rack_satisfies(board, rack, placements)?;
    Ok(axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn across(row: usize, col: usize, word: &str) -> Vec<Placement> {
        word.chars()
            .enumerate()
            .map(|(i, c)| Placement::new(row, col + i, c))
            .collect()
    }

    fn rack(s: &str) -> Rack {
        Rack::parse(s).unwrap()
    }

    fn board_with(placements: &[Placement]) -> Board {
        Board::standard().with_placements(placements)
    }

    #[test]
    fn test_first_move_must_cover_center() {
        let board = Board::standard();
        let result = check_placements(&board, &rack("CAT"), &across(0, 0, "CAT"));
        assert_eq!(result, Err(RuleViolation::CenterNotCovered));

        let result = check_placements(&board, &rack("CAT"), &across(7, 7, "CAT"));
        assert_eq!(result, Ok(Axis::Across));
    }

    #[test]
    fn test_covers_center_counts_anchors() {
        let board = Board::standard();
        assert!(covers_center(&board, &across(7, 5, "HELLO")));
        assert!(!covers_center(&board, &across(6, 5, "HELLO")));
    }

    #[test]
    fn test_diagonal_is_no_line() {
        let placements = vec![Placement::new(7, 7, 'A'), Placement::new(8, 8, 'B')];
        assert_eq!(in_single_line(&placements), None);
        assert_eq!(
            check_placements(&Board::standard(), &rack("AB"), &placements),
            Err(RuleViolation::NoLine)
        );
    }

    #[test]
    fn test_two_rows_two_cols_is_no_line() {
        let placements = vec![
            Placement::new(7, 7, 'A'),
            Placement::new(7, 8, 'B'),
            Placement::new(8, 7, 'C'),
            Placement::new(8, 8, 'D'),
        ];
        assert_eq!(in_single_line(&placements), None);
    }

    #[test]
    fn test_vertical_line_detected() {
        let placements = vec![Placement::new(7, 7, 'A'), Placement::new(8, 7, 'T')];
        assert_eq!(in_single_line(&placements), Some(Axis::Down));
        assert_eq!(in_single_line(&placements[..1]), Some(Axis::Across));
        assert_eq!(in_single_line(&[]), None);
    }

    #[test]
    fn test_gap_is_rejected() {
        let board = Board::standard();
        let placements = vec![Placement::new(7, 7, 'C'), Placement::new(7, 9, 'T')];
        assert_eq!(
            check_placements(&board, &rack("CT"), &placements),
            Err(RuleViolation::Gap(Coord::new(7, 8)))
        );
    }

    #[test]
    fn test_gap_filled_by_existing_letter() {
        let board = board_with(&across(7, 7, "A"));
        let placements = vec![Placement::new(7, 6, 'C'), Placement::new(7, 8, 'T')];
        assert_eq!(no_gaps_along_line(&board, &placements, Axis::Across), Ok(()));
        assert_eq!(
            check_placements(&board, &rack("CT"), &placements),
            Ok(Axis::Across)
        );
    }

    #[test]
    fn test_must_connect_after_first_move() {
        let board = board_with(&across(7, 7, "CAT"));
        let result = check_placements(&board, &rack("DOG"), &across(0, 0, "DOG"));
        assert_eq!(result, Err(RuleViolation::NotConnected));

        // Hooking below the T.
        let hook = vec![Placement::new(8, 9, 'O')];
        assert!(connects_to_existing(&board, &hook));
    }

    #[test]
    fn test_occupied_cell_rejected_even_with_same_letter() {
        let board = board_with(&across(7, 7, "CAT"));
        let placements = vec![Placement::new(7, 7, 'C'), Placement::new(8, 7, 'O')];
        assert_eq!(
            check_placements(&board, &rack("CO"), &placements),
            Err(RuleViolation::CellOccupied(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let board = Board::standard();
        let placements = vec![Placement::new(7, 7, 'A'), Placement::new(7, 7, 'B')];
        assert_eq!(
            rack_satisfies(&board, &rack("AB"), &placements),
            Err(RuleViolation::DuplicateCell(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_rack_shortage() {
        let board = Board::standard();
        let result = check_placements(&board, &rack("CAT"), &across(7, 7, "CATT"));
        assert_eq!(result, Err(RuleViolation::RackMissingTile('T')));
    }

    #[test]
    fn test_wildcards_cover_bound_placements() {
        let board = Board::standard();
        let placements = vec![
            Placement::new(7, 7, 'C'),
            Placement::wildcard(7, 8, 'A'),
            Placement::wildcard(7, 9, 'T'),
        ];
        assert_eq!(rack_satisfies(&board, &rack("C ? ?"), &placements), Ok(()));
        assert_eq!(
            rack_satisfies(&board, &rack("C ?"), &placements),
            Err(RuleViolation::RackMissingTile('?'))
        );
    }

    #[test]
    fn test_unbound_wildcard_rejected() {
        let board = Board::standard();
        let placements = vec![Placement {
            row: 7,
            col: 7,
            letter: WILDCARD,
            binding: None,
        }];
        assert_eq!(
            rack_satisfies(&board, &rack("?"), &placements),
            Err(RuleViolation::WildcardUnbound(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::standard();
        let placements = vec![Placement::new(7, 15, 'A')];
        assert_eq!(
            check_placements(&board, &rack("A"), &placements),
            Err(RuleViolation::OutOfBounds(Coord::new(7, 15)))
        );
    }

    #[test]
    fn test_violation_codes() {
        assert_eq!(RuleViolation::RackMissingTile('X').code(), "rack_missing_tile");
        assert_eq!(
            RuleViolation::RackMissingTile('X').to_string(),
            "rack_missing_tile: X"
        );
        assert_eq!(
            RuleViolation::CellOccupied(Coord::new(1, 2)).to_string(),
            "cell_occupied: (1,2)"
        );
    }
}
