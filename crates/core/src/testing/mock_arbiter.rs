//! Mock word arbiter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::adjudicator::{ArbiterError, ArbiterRuling, WordArbiter};
use crate::text::normalize_word;

/// Arbiter with scripted rulings. Words without a ruling are left out of
/// the answer, which callers treat as invalid.
#[derive(Debug, Default)]
pub struct MockArbiter {
    rulings: HashMap<String, bool>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ruling(mut self, word: &str, valid: bool) -> Self {
        self.rulings.insert(normalize_word(word), valid);
        self
    }

    /// Every call fails.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub async fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WordArbiter for MockArbiter {
    fn name(&self) -> &str {
        "mock-arbiter"
    }

    async fn judge(
        &self,
        words: &[String],
        _language: &str,
    ) -> Result<Vec<ArbiterRuling>, ArbiterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ArbiterError::Parse("simulated arbiter failure".to_string()));
        }
        Ok(words
            .iter()
            .filter_map(|w| {
                self.rulings.get(&normalize_word(w)).map(|valid| ArbiterRuling {
                    word: w.clone(),
                    valid: *valid,
                    reason: Some("scripted".to_string()),
                })
            })
            .collect())
    }
}
