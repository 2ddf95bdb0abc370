//! Word extraction: every word a set of placements forms.

use serde::{Deserialize, Serialize};

use crate::board::{Axis, Board, Coord, Placement};

/// A word on the board and the cells it occupies, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordInstance {
    pub text: String,
    pub cells: Vec<Coord>,
    pub axis: Axis,
}

impl WordInstance {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Contiguous run of letters through `start` along `axis`.
fn run_through(board: &Board, start: Coord, axis: Axis) -> Vec<Coord> {
    let size = board.size();
    let mut first = start;
    while let Some(prev) = first.step(axis, false, size) {
        if !board.is_occupied(prev) {
            break;
        }
        first = prev;
    }

    let mut cells = vec![first];
    let mut cursor = first;
    while let Some(next) = cursor.step(axis, true, size) {
        if !board.is_occupied(next) {
            break;
        }
        cells.push(next);
        cursor = next;
    }
    cells
}

fn word_at(board: &Board, start: Coord, axis: Axis) -> Option<WordInstance> {
    let cells = run_through(board, start, axis);
    if cells.len() < 2 {
        return None;
    }
    let text = cells.iter().filter_map(|c| board.letter_at(*c)).collect();
    Some(WordInstance { text, cells, axis })
}

/// Words formed by `placements` on `board` (the board before the move).
///
/// The main word along `axis` comes first, then perpendicular hooks in
/// placement order. Runs of a single letter are not words. Wildcards read
/// as their bound letter.
pub fn extract_words(board: &Board, placements: &[Placement], axis: Axis) -> Vec<WordInstance> {
    let Some(first) = placements.first() else {
        return Vec::new();
    };
    let scratch = board.with_placements(placements);

    let mut words = Vec::with_capacity(placements.len() + 1);
    if let Some(main) = word_at(&scratch, first.coord(), axis) {
        words.push(main);
    }
    let cross = axis.perpendicular();
    for p in placements {
        if let Some(hook) = word_at(&scratch, p.coord(), cross) {
            words.push(hook);
        }
    }
    words
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

    fn texts(words: &[WordInstance]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_first_move_single_word() {
        let words = extract_words(&Board::standard(), &across(7, 7, "CAT"), Axis::Across);
        assert_eq!(texts(&words), vec!["CAT"]);
        assert_eq!(
            words[0].cells,
            vec![Coord::new(7, 7), Coord::new(7, 8), Coord::new(7, 9)]
        );
    }

    #[test]
    fn test_extension_includes_existing_letters() {
        let board = Board::standard().with_placements(&across(7, 7, "CAT"));
        let words = extract_words(&board, &[Placement::new(7, 10, 'S')], Axis::Across);
        assert_eq!(texts(&words), vec!["CATS"]);
    }

    #[test]
    fn test_hooks_follow_main_word_in_placement_order() {
        // NO under the A and T of CAT forms AN and TO.
        let board = Board::standard().with_placements(&across(7, 7, "CAT"));
        let placements = vec![Placement::new(8, 8, 'N'), Placement::new(8, 9, 'O')];
        let words = extract_words(&board, &placements, Axis::Across);
        assert_eq!(texts(&words), vec!["NO", "AN", "TO"]);
        assert_eq!(words[0].axis, Axis::Across);
        assert_eq!(words[1].axis, Axis::Down);
    }

    #[test]
    fn test_single_tile_reports_perpendicular_word() {
        let board = Board::standard().with_placements(&across(7, 7, "CAT"));
        let words = extract_words(&board, &[Placement::new(8, 7, 'O')], Axis::Across);
        assert_eq!(texts(&words), vec!["CO"]);
        assert_eq!(words[0].axis, Axis::Down);
    }

    #[test]
    fn test_lone_tile_forms_nothing() {
        let words = extract_words(&Board::standard(), &[Placement::new(7, 7, 'A')], Axis::Across);
        assert!(words.is_empty());
    }

    #[test]
    fn test_wildcard_reads_as_binding() {
        let placements = vec![
            Placement::new(7, 7, 'C'),
            Placement::wildcard(7, 8, 'A'),
            Placement::new(7, 9, 'T'),
        ];
        let words = extract_words(&Board::standard(), &placements, Axis::Across);
        assert_eq!(texts(&words), vec!["CAT"]);
    }

    #[test]
    fn test_vertical_main_word() {
        let placements = vec![
            Placement::new(6, 7, 'D'),
            Placement::new(7, 7, 'O'),
            Placement::new(8, 7, 'G'),
        ];
        let words = extract_words(&Board::standard(), &placements, Axis::Down);
        assert_eq!(texts(&words), vec!["DOG"]);
        assert_eq!(words[0].axis, Axis::Down);
    }

    #[test]
    fn test_does_not_mutate_board() {
        let board = Board::standard();
        let _ = extract_words(&board, &across(7, 7, "CAT"), Axis::Across);
        assert!(board.is_empty());
    }
}
