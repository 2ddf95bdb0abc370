//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's external
//! seams (move providers, remote dictionaries, arbiters, LLM clients) so a
//! whole turn can be driven without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use tilerace_core::testing::{MockProvider, fixtures};
//!
//! let provider = MockProvider::new("p1")
//!     .with_response(fixtures::move_json(&[(7, 7, "C"), (7, 8, "A"), (7, 9, "T")]));
//! let pipeline = fixtures::pipeline(&["CAT"], vec![Arc::new(provider)]);
//! let report = pipeline.evaluate_turn(&fixtures::empty_snapshot("C A T ? ? ? ?")).await?;
//! ```

mod mock_arbiter;
mod mock_llm_client;
mod mock_provider;
mod mock_remote_dictionary;

pub use mock_arbiter::MockArbiter;
pub use mock_llm_client::MockLlmClient;
pub use mock_provider::MockProvider;
pub use mock_remote_dictionary::{MockRemoteDictionary, RecordedLookup};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    use crate::adjudicator::{LocalDictionary, TieredAdjudicator, ValidationCache};
    use crate::board::{Axis, Board, Placement, PremiumLayout, Rack, TileSet, BOARD_SIZE};
    use crate::pipeline::TurnPipeline;
    use crate::provider::{MoveProvider, ProposalRequest};
    use crate::snapshot::StateSnapshot;

    /// Snapshot of an empty standard board.
    pub fn empty_snapshot(rack: &str) -> StateSnapshot {
        StateSnapshot::empty(BOARD_SIZE, rack)
    }

    /// Snapshot with `word` already on the board starting at (`row`, `col`).
    pub fn snapshot_with_word(row: usize, col: usize, axis: Axis, word: &str, rack: &str) -> StateSnapshot {
        let placements = word_placements(row, col, axis, word);
        let board = Board::standard().with_placements(&placements);
        let mut snapshot = StateSnapshot::from_board(&board, &Rack::new(Vec::new()));
        snapshot.rack = rack.to_string();
        snapshot
    }

    /// Literal placements spelling `word` from (`row`, `col`).
    pub fn word_placements(row: usize, col: usize, axis: Axis, word: &str) -> Vec<Placement> {
        word.chars()
            .enumerate()
            .map(|(i, ch)| match axis {
                Axis::Across => Placement::new(row, col + i, ch),
                Axis::Down => Placement::new(row + i, col, ch),
            })
            .collect()
    }

    /// Provider JSON placing the given `(row, col, letter)` tiles.
    pub fn move_json(tiles: &[(usize, usize, &str)]) -> String {
        let placements = tiles
            .iter()
            .map(|(row, col, letter)| {
                serde_json::json!({ "row": row, "col": col, "letter": letter })
            })
            .collect::<Vec<_>>();
        serde_json::json!({ "placements": placements }).to_string()
    }

    /// Shared cache with generous limits.
    pub fn cache() -> Arc<ValidationCache> {
        Arc::new(ValidationCache::new(1_000, Duration::from_secs(3600)))
    }

    /// English adjudicator backed by a local word list.
    pub fn adjudicator(words: &[&str]) -> TieredAdjudicator {
        TieredAdjudicator::new(cache(), "en")
            .with_dictionary(Arc::new(LocalDictionary::from_words("en", words)))
    }

    /// Standard English pipeline over `providers` with a local word list and
    /// a five-second turn deadline.
    pub fn pipeline(words: &[&str], providers: Vec<Arc<dyn MoveProvider>>) -> TurnPipeline {
        TurnPipeline::new(adjudicator(words), providers).with_turn_timeout(Duration::from_secs(5))
    }

    /// Proposal request for an empty standard English board.
    pub fn proposal_request(rack: &str) -> ProposalRequest {
        ProposalRequest {
            turn_id: Uuid::new_v4(),
            snapshot: empty_snapshot(rack),
            language: "en".to_string(),
            tile_summary: TileSet::english().summary(),
            premium_summary: PremiumLayout::standard().summary(),
        }
    }
}
