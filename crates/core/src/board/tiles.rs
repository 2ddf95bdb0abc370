//! Tile sets: letter values and distributions per language variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::types::WILDCARD;
use super::BoardError;
use crate::text::normalize_letter;

/// One letter entry of a variant definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSpec {
    pub letter: String,
    pub count: u32,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VariantFile {
    name: String,
    #[serde(default)]
    language: Option<String>,
    letters: Vec<TileSpec>,
}

/// Letter values and counts for a game variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    name: String,
    language: String,
    points: BTreeMap<char, u32>,
    counts: BTreeMap<char, u32>,
}

const ENGLISH: &[(char, u32, u32)] = &[
    ('A', 9, 1), ('B', 2, 3), ('C', 2, 3), ('D', 4, 2), ('E', 12, 1),
    ('F', 2, 4), ('G', 3, 2), ('H', 2, 4), ('I', 9, 1), ('J', 1, 8),
    ('K', 1, 5), ('L', 4, 1), ('M', 2, 3), ('N', 6, 1), ('O', 8, 1),
    ('P', 2, 3), ('Q', 1, 10), ('R', 6, 1), ('S', 4, 1), ('T', 6, 1),
    ('U', 4, 1), ('V', 2, 4), ('W', 2, 4), ('X', 1, 8), ('Y', 2, 4),
    ('Z', 1, 10), (WILDCARD, 2, 0),
];

const SLOVAK: &[(char, u32, u32)] = &[
    ('A', 9, 1), ('Á', 1, 4), ('Ä', 1, 10), ('B', 2, 4), ('C', 1, 4),
    ('Č', 1, 5), ('D', 3, 2), ('Ď', 1, 8), ('E', 8, 1), ('É', 1, 7),
    ('F', 1, 8), ('G', 1, 8), ('H', 1, 4), ('I', 5, 1), ('Í', 1, 5),
    ('J', 2, 3), ('K', 3, 2), ('L', 3, 2), ('Ĺ', 1, 10), ('Ľ', 1, 7),
    ('M', 4, 2), ('N', 5, 1), ('Ň', 1, 8), ('O', 9, 1), ('Ô', 1, 8),
    ('Ó', 1, 10), ('P', 3, 2), ('R', 4, 1), ('Ŕ', 1, 10), ('S', 4, 1),
    ('Š', 1, 5), ('T', 4, 1), ('Ť', 1, 7), ('U', 2, 3), ('Ú', 1, 7),
    ('V', 4, 1), ('X', 1, 10), ('Y', 1, 4), ('Ý', 1, 5), ('Z', 1, 4),
    ('Ž', 1, 5), (WILDCARD, 2, 0),
];

impl TileSet {
    fn from_table(name: &str, language: &str, table: &[(char, u32, u32)]) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            points: table.iter().map(|(l, _, p)| (*l, *p)).collect(),
            counts: table.iter().map(|(l, c, _)| (*l, *c)).collect(),
        }
    }

    pub fn english() -> Self {
        Self::from_table("english", "en", ENGLISH)
    }

    pub fn slovak() -> Self {
        Self::from_table("slovak", "sk", SLOVAK)
    }

    /// Look up a built-in variant by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Self::english()),
            "slovak" | "sk" => Some(Self::slovak()),
            _ => None,
        }
    }

    /// Load a variant from a JSON file of the form
    /// `{"name": "...", "language": "...", "letters": [{"letter", "count", "points"}]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, BoardError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BoardError::Io(e.to_string()))?;
        let file: VariantFile =
            serde_json::from_str(&content).map_err(|e| BoardError::Json(e.to_string()))?;

        let mut points = BTreeMap::new();
        let mut counts = BTreeMap::new();
        for spec in &file.letters {
            let letter = normalize_letter(&spec.letter)
                .ok_or_else(|| BoardError::InvalidLetter(spec.letter.clone()))?;
            points.insert(letter, spec.points);
            counts.insert(letter, spec.count);
        }
        // Variants always allow wildcards even when the file omits them.
        points.insert(WILDCARD, 0);
        counts.entry(WILDCARD).or_insert(0);

        Ok(Self {
            language: file.language.unwrap_or_else(|| file.name.clone()),
            name: file.name,
            points,
            counts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Base value of a letter. Wildcards and unknown letters are worth 0.
    pub fn points(&self, letter: char) -> u32 {
        if letter == WILDCARD {
            return 0;
        }
        self.points.get(&letter).copied().unwrap_or(0)
    }

    pub fn contains(&self, letter: char) -> bool {
        self.points.contains_key(&letter)
    }

    pub fn total_tiles(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Compact `letter:count(points)` listing for prompts.
    pub fn summary(&self) -> String {
        self.counts
            .iter()
            .map(|(letter, count)| format!("{}:{}({})", letter, count, self.points(*letter)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_english_values() {
        let tiles = TileSet::english();
        assert_eq!(tiles.points('C'), 3);
        assert_eq!(tiles.points('A'), 1);
        assert_eq!(tiles.points('T'), 1);
        assert_eq!(tiles.points('Q'), 10);
        assert_eq!(tiles.points(WILDCARD), 0);
        assert_eq!(tiles.total_tiles(), 100);
    }

    #[test]
    fn test_slovak_values() {
        let tiles = TileSet::slovak();
        assert_eq!(tiles.points('Ä'), 10);
        assert_eq!(tiles.points('Č'), 5);
        assert!(tiles.contains('Ô'));
        assert!(!tiles.contains('Q'));
        assert_eq!(tiles.language(), "sk");
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(TileSet::builtin("English").unwrap().name(), "english");
        assert_eq!(TileSet::builtin("sk").unwrap().name(), "slovak");
        assert!(TileSet::builtin("klingon").is_none());
    }

    #[test]
    fn test_unknown_letter_scores_zero() {
        assert_eq!(TileSet::english().points('Ž'), 0);
    }

    #[test]
    fn test_from_json_file_normalizes_letters() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"mini","letters":[{{"letter":"a","count":3,"points":1}},{{"letter":"č","count":1,"points":5}}]}}"#
        )
        .unwrap();

        let tiles = TileSet::from_json_file(file.path()).unwrap();
        assert_eq!(tiles.name(), "mini");
        assert_eq!(tiles.language(), "mini");
        assert_eq!(tiles.points('A'), 1);
        assert_eq!(tiles.points('Č'), 5);
        assert!(tiles.contains(WILDCARD));
    }

    #[test]
    fn test_from_json_file_rejects_multi_letter_tiles() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"bad","letters":[{{"letter":"CH","count":1,"points":5}}]}}"#
        )
        .unwrap();

        assert!(matches!(
            TileSet::from_json_file(file.path()),
            Err(BoardError::InvalidLetter(_))
        ));
    }
}
