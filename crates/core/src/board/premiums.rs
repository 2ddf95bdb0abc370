//! Premium square layouts.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::{Coord, Premium, BOARD_SIZE};
use super::BoardError;

const QUARTER: usize = 1 + BOARD_SIZE / 2;

/// Upper-left quarter of the standard layout, mirrored both ways to fill the board.
const STANDARD_QUARTER: [&str; QUARTER] = [
    "TW -- -- DL -- -- -- TW",
    "-- DW -- -- -- TL -- --",
    "-- -- DW -- -- -- DL --",
    "DL -- -- DW -- -- -- DL",
    "-- -- -- -- DW -- -- --",
    "-- TL -- -- -- TL -- --",
    "-- -- DL -- -- -- DL --",
    "TW -- -- DL -- -- -- DW",
];

/// Premium placement for a whole board plus its first-move anchor cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumLayout {
    squares: Vec<Vec<Option<Premium>>>,
    anchors: Vec<Coord>,
}

impl PremiumLayout {
    /// The standard 15x15 layout with the center as the only anchor.
    pub fn standard() -> Self {
        let mut squares = vec![vec![None; BOARD_SIZE]; BOARD_SIZE];
        for (i, row) in STANDARD_QUARTER.iter().enumerate() {
            for (j, tag) in row.split(' ').enumerate() {
                let premium = tag.parse::<Premium>().ok();
                squares[i][j] = premium;
                squares[BOARD_SIZE - i - 1][j] = premium;
                squares[i][BOARD_SIZE - j - 1] = premium;
                squares[BOARD_SIZE - i - 1][BOARD_SIZE - j - 1] = premium;
            }
        }
        Self {
            squares,
            anchors: vec![Coord::new(BOARD_SIZE / 2, BOARD_SIZE / 2)],
        }
    }

    /// Build a layout from a square grid of tags (`"DL"`, `"TL"`, `"DW"`, `"TW"`,
    /// or an empty string / `"--"` for plain squares).
    pub fn from_tags(tags: &[Vec<String>]) -> Result<Self, BoardError> {
        let size = tags.len();
        if size == 0 {
            return Err(BoardError::InvalidRowCount(0));
        }
        let mut squares = Vec::with_capacity(size);
        for row in tags {
            if row.len() != size {
                return Err(BoardError::InvalidRowLength(row.len()));
            }
            let parsed = row
                .iter()
                .map(|tag| match tag.trim() {
                    "" | "--" | "." => Ok(None),
                    other => other.parse::<Premium>().map(Some),
                })
                .collect::<Result<Vec<_>, _>>()?;
            squares.push(parsed);
        }
        Ok(Self {
            squares,
            anchors: vec![Coord::new(size / 2, size / 2)],
        })
    }

    /// Load a layout from a JSON file holding a square array of tags.
    pub fn from_json_file(path: &Path) -> Result<Self, BoardError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BoardError::Io(e.to_string()))?;
        let tags: Vec<Vec<String>> =
            serde_json::from_str(&content).map_err(|e| BoardError::Json(e.to_string()))?;
        Self::from_tags(&tags)
    }

    pub fn size(&self) -> usize {
        self.squares.len()
    }

    pub fn anchors(&self) -> &[Coord] {
        &self.anchors
    }

    pub fn premium_at(&self, coord: Coord) -> Option<Premium> {
        self.squares
            .get(coord.row)
            .and_then(|row| row.get(coord.col))
            .copied()
            .flatten()
    }

    /// One line per premium kind listing its cells, for prompts.
    pub fn summary(&self) -> String {
        let kinds = [
            Premium::TripleWord,
            Premium::DoubleWord,
            Premium::TripleLetter,
            Premium::DoubleLetter,
        ];
        kinds
            .iter()
            .map(|kind| {
                let cells = self
                    .squares
                    .iter()
                    .enumerate()
                    .flat_map(|(r, row)| {
                        row.iter()
                            .enumerate()
                            .filter(|(_, p)| **p == Some(*kind))
                            .map(move |(c, _)| format!("{},{}", r, c))
                    })
                    .collect::<Vec<_>>();
                format!("{}: {}", kind, cells.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for PremiumLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_standard_layout_is_symmetric() {
        let layout = PremiumLayout::standard();
        assert_eq!(layout.size(), BOARD_SIZE);
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let p = layout.premium_at(Coord::new(r, c));
                assert_eq!(p, layout.premium_at(Coord::new(c, r)), "diag at {r},{c}");
                assert_eq!(p, layout.premium_at(Coord::new(BOARD_SIZE - 1 - r, c)));
            }
        }
    }

    #[test]
    fn test_standard_layout_known_squares() {
        let layout = PremiumLayout::standard();
        assert_eq!(layout.premium_at(Coord::new(7, 7)), Some(Premium::DoubleWord));
        assert_eq!(layout.premium_at(Coord::new(0, 0)), Some(Premium::TripleWord));
        assert_eq!(layout.premium_at(Coord::new(0, 3)), Some(Premium::DoubleLetter));
        assert_eq!(layout.premium_at(Coord::new(1, 5)), Some(Premium::TripleLetter));
        assert_eq!(layout.premium_at(Coord::new(7, 8)), None);
        assert_eq!(layout.premium_at(Coord::new(7, 9)), None);
        assert_eq!(layout.anchors(), &[Coord::new(7, 7)]);
    }

    #[test]
    fn test_standard_layout_counts() {
        let layout = PremiumLayout::standard();
        let count = |kind: Premium| {
            (0..BOARD_SIZE)
                .flat_map(|r| (0..BOARD_SIZE).map(move |c| Coord::new(r, c)))
                .filter(|c| layout.premium_at(*c) == Some(kind))
                .count()
        };
        assert_eq!(count(Premium::TripleWord), 8);
        assert_eq!(count(Premium::DoubleWord), 17);
        assert_eq!(count(Premium::TripleLetter), 12);
        assert_eq!(count(Premium::DoubleLetter), 24);
    }

    #[test]
    fn test_from_tags_rejects_ragged_rows() {
        let tags = vec![vec!["".to_string(); 3], vec!["".to_string(); 2], vec![]];
        assert!(matches!(
            PremiumLayout::from_tags(&tags),
            Err(BoardError::InvalidRowLength(2))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[["TW","",""],["","DW",""],["","","dl"]]"#).unwrap();

        let layout = PremiumLayout::from_json_file(file.path()).unwrap();
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.premium_at(Coord::new(0, 0)), Some(Premium::TripleWord));
        assert_eq!(layout.premium_at(Coord::new(2, 2)), Some(Premium::DoubleLetter));
        assert_eq!(layout.anchors(), &[Coord::new(1, 1)]);
    }

    #[test]
    fn test_summary_lists_center() {
        let summary = PremiumLayout::standard().summary();
        assert!(summary.lines().any(|l| l.starts_with("DW:") && l.contains("7,7")));
    }
}
