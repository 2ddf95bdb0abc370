//! Player rack: the multiset of tiles available this turn.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::types::{Placement, WILDCARD};
use super::BoardError;
use crate::text::normalize_letter;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    tiles: Vec<char>,
}

impl Rack {
    pub fn new(tiles: Vec<char>) -> Self {
        Self { tiles }
    }

    /// Parse a rack string.
    ///
    /// Tokens may be separated by whitespace or commas (`"C A T ? ?"`);
    /// without separators every character is one tile (`"CAT??"`).
    pub fn parse(raw: &str) -> Result<Self, BoardError> {
        let separated = raw.contains(|c: char| c.is_whitespace() || c == ',');
        let tokens: Vec<String> = if separated {
            raw.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            crate::text::normalize_word(raw)
                .chars()
                .map(String::from)
                .collect()
        };

        let tiles = tokens
            .iter()
            .map(|t| {
                normalize_letter(t)
                    .filter(|c| *c == WILDCARD || c.is_alphabetic())
                    .ok_or_else(|| BoardError::InvalidLetter(t.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[char] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile counts keyed by letter (wildcards under [`WILDCARD`]).
    pub fn counts(&self) -> HashMap<char, usize> {
        let mut counts = HashMap::new();
        for tile in &self.tiles {
            *counts.entry(*tile).or_insert(0) += 1;
        }
        counts
    }

    /// Tiles left after playing `placements`, in original rack order.
    ///
    /// Each placement removes one tile: its literal letter, or a wildcard for
    /// wildcard placements. Placements the rack cannot cover are ignored; the
    /// rule checker rejects those moves before they get here.
    pub fn consume(&self, placements: &[Placement]) -> Rack {
        let mut needed: HashMap<char, usize> = HashMap::new();
        for p in placements {
            let tile = if p.is_wildcard() { WILDCARD } else { p.letter };
            *needed.entry(tile).or_insert(0) += 1;
        }

        let mut remaining = Vec::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            match needed.get_mut(tile) {
                Some(n) if *n > 0 => *n -= 1,
                _ => remaining.push(*tile),
            }
        }
        Rack { tiles: remaining }
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .tiles
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}
