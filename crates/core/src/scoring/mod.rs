//! Premium-aware move scoring.
//!
//! Scoring only reads premiums. Consumption is a separate step,
//! [`apply_premium_consumption`], run by the caller once a move is committed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::board::{Board, Coord, Placement, Rack, TileSet};
use crate::words::WordInstance;

/// Bonus parameters for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points added when a move plays the whole rack.
    pub bingo_bonus: u32,
    /// Minimum tiles the move must place for the bonus.
    pub bingo_tiles: usize,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            bingo_bonus: 50,
            bingo_tiles: 7,
        }
    }
}

/// Score breakdown for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    /// Sum of letter values before any premium.
    pub base_points: u32,
    /// Extra points from letter premiums.
    pub letter_bonus_points: u32,
    /// Product of word premiums.
    pub word_multiplier: u32,
    pub total: u32,
}

/// Score breakdown for a whole move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveScore {
    pub words: Vec<WordScore>,
    pub bingo_bonus: u32,
    pub total: u32,
}

/// Score a single word. `new_tiles` maps newly covered cells to their placements.
fn score_word(
    board: &Board,
    word: &WordInstance,
    new_tiles: &HashMap<Coord, &Placement>,
    tiles: &TileSet,
) -> WordScore {
    let mut base_points = 0;
    let mut letter_bonus_points = 0;
    let mut word_multiplier = 1;

    for coord in &word.cells {
        let cell = board.cell(*coord);
        let (value, premium) = match new_tiles.get(coord) {
            Some(p) => {
                let value = if p.is_wildcard() { 0 } else { tiles.points(p.letter) };
                (value, cell.and_then(|c| c.active_premium()))
            }
            None => {
                // Existing tile: its premium was spent when it was played.
                let value = match cell {
                    Some(c) if c.is_wildcard => 0,
                    Some(c) => c.letter.map(|l| tiles.points(l)).unwrap_or(0),
                    None => 0,
                };
                (value, None)
            }
        };

        base_points += value;
        if let Some(premium) = premium {
            letter_bonus_points += value * (premium.letter_multiplier() - 1);
            word_multiplier *= premium.word_multiplier();
        }
    }

    WordScore {
        word: word.text.clone(),
        base_points,
        letter_bonus_points,
        word_multiplier,
        total: (base_points + letter_bonus_points) * word_multiplier,
    }
}

/// Whether a move placing `placed` tiles from `rack` earns the bonus.
pub fn earns_bingo(rack: &Rack, placed: usize, rules: &ScoringRules) -> bool {
    placed > 0 && placed >= rules.bingo_tiles && placed == rack.len()
}

/// Score a move. `board` is the board before the move; `words` come from the
/// word extractor.
pub fn score_move(
    board: &Board,
    placements: &[Placement],
    words: &[WordInstance],
    rack: &Rack,
    tiles: &TileSet,
    rules: &ScoringRules,
) -> MoveScore {
    let new_tiles: HashMap<Coord, &Placement> =
        placements.iter().map(|p| (p.coord(), p)).collect();

    let words: Vec<WordScore> = words
        .iter()
        .map(|w| score_word(board, w, &new_tiles, tiles))
        .collect();

    let bingo_bonus = if earns_bingo(rack, placements.len(), rules) {
        rules.bingo_bonus
    } else {
        0
    };
    let total = words.iter().map(|w| w.total).sum::<u32>() + bingo_bonus;

    MoveScore {
        words,
        bingo_bonus,
        total,
    }
}

/// Mark the premiums under `placements` as used.
///
/// Call once after the move is committed. Already-consumed premiums stay
/// consumed, so repeating the call changes nothing. Returns how many
/// premiums this call flipped.
pub fn apply_premium_consumption(board: &mut Board, placements: &[Placement]) -> usize {
    placements
        .iter()
        .filter(|p| board.consume_premium(p.coord()))
        .count()
}
