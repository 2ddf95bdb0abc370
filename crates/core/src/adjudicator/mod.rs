//! Tiered word adjudication.
//!
//! A word passes through pattern, cache, local dictionary and remote
//! dictionary tiers; what none of them confirms is left for an arbiter.

mod arbiter;
mod cache;
mod dictionary;
mod remote;
mod tiered;
mod types;

pub use arbiter::{resolve_with_arbiter, ArbiterError, ArbiterRuling, LlmArbiter, WordArbiter};
pub use cache::{CacheStats, ValidationCache};
pub use dictionary::{DictionaryError, LocalDictionary};
pub use remote::{JulsDictionary, RemoteDictionary, RemoteLookupError};
pub use tiered::TieredAdjudicator;
pub use types::{all_valid, Tier, Verdict, WordJudgement};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Adjudicator tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdjudicatorConfig {
    /// Words of at most this many letters never reach the remote tier.
    #[serde(default = "default_short_word_threshold")]
    pub short_word_threshold: usize,
    /// Shortest acceptable word.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
    /// Longest acceptable word.
    #[serde(default = "default_max_word_len")]
    pub max_word_len: usize,
    /// Remote lookup attempts per word.
    #[serde(default = "default_remote_attempts")]
    pub remote_attempts: u32,
    /// Timeout of the first remote attempt; attempt `n` gets `n` times this.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
    /// Pause between remote attempts.
    #[serde(default = "default_remote_backoff_ms")]
    pub remote_backoff_ms: u64,
}

fn default_short_word_threshold() -> usize {
    7
}

fn default_min_word_len() -> usize {
    2
}

fn default_max_word_len() -> usize {
    15
}

fn default_remote_attempts() -> u32 {
    2
}

fn default_remote_timeout_ms() -> u64 {
    2_000
}

fn default_remote_backoff_ms() -> u64 {
    250
}

impl Default for AdjudicatorConfig {
    fn default() -> Self {
        Self {
            short_word_threshold: default_short_word_threshold(),
            min_word_len: default_min_word_len(),
            max_word_len: default_max_word_len(),
            remote_attempts: default_remote_attempts(),
            remote_timeout_ms: default_remote_timeout_ms(),
            remote_backoff_ms: default_remote_backoff_ms(),
        }
    }
}

impl AdjudicatorConfig {
    /// Timeout for the 1-based `attempt`.
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.remote_timeout_ms.saturating_mul(attempt.max(1) as u64))
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.remote_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_word_len == 0 || self.min_word_len > self.max_word_len {
            return Err(format!(
                "adjudicator word length bounds are invalid: {}..={}",
                self.min_word_len, self.max_word_len
            ));
        }
        if self.short_word_threshold == 0 || self.short_word_threshold > self.max_word_len {
            return Err(format!(
                "adjudicator.short_word_threshold must be between 1 and {}, got {}",
                self.max_word_len, self.short_word_threshold
            ));
        }
        if self.remote_attempts == 0 {
            return Err("adjudicator.remote_attempts must be at least 1".to_string());
        }
        if self.remote_timeout_ms == 0 {
            return Err("adjudicator.remote_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
