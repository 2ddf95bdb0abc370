//! The tier state machine.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use super::cache::ValidationCache;
use super::dictionary::LocalDictionary;
use super::remote::{RemoteDictionary, RemoteLookupError};
use super::types::{Tier, Verdict, WordJudgement};
use super::AdjudicatorConfig;
use crate::metrics;
use crate::text::{letter_count, normalize_word};

/// Characters allowed in a word besides letters.
const PERMITTED_PUNCTUATION: [char; 2] = ['-', '\''];

/// Word oracle running pattern → cache → local dictionary → remote dictionary,
/// and flagging whatever is left for external arbitration.
///
/// The cache is injected so several adjudicators (or turns) can share it.
pub struct TieredAdjudicator {
    cache: Arc<ValidationCache>,
    dictionary: Option<Arc<LocalDictionary>>,
    remote: Option<Arc<dyn RemoteDictionary>>,
    language: String,
    config: AdjudicatorConfig,
}

impl TieredAdjudicator {
    pub fn new(cache: Arc<ValidationCache>, language: impl Into<String>) -> Self {
        Self {
            cache,
            dictionary: None,
            remote: None,
            language: language.into(),
            config: AdjudicatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AdjudicatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Arc<LocalDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteDictionary>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        &self.cache
    }

    /// Shape check: length bounds and allowed characters.
    pub fn check_pattern(&self, word: &str) -> Result<(), String> {
        if word.is_empty() {
            return Err("empty word".to_string());
        }
        let len = letter_count(word);
        if len < self.config.min_word_len || len > self.config.max_word_len {
            return Err(format!(
                "length {} outside {}..={}",
                len, self.config.min_word_len, self.config.max_word_len
            ));
        }
        if let Some(bad) = word
            .chars()
            .find(|c| !c.is_alphabetic() && !PERMITTED_PUNCTUATION.contains(c))
        {
            return Err(format!("invalid character {:?}", bad));
        }
        if !word.chars().any(char::is_alphabetic) {
            return Err("no letters".to_string());
        }
        Ok(())
    }

    /// Adjudicate one word.
    pub async fn adjudicate(&self, raw: &str) -> WordJudgement {
        let word = normalize_word(raw);
        let judgement = self.run_tiers(&word).await;
        metrics::ADJUDICATIONS
            .with_label_values(&[judgement.tier.as_str(), verdict_label(judgement.verdict)])
            .inc();
        debug!(
            word = %judgement.word,
            tier = %judgement.tier,
            verdict = ?judgement.verdict,
            "Adjudicated word"
        );
        judgement
    }

    /// Adjudicate several words concurrently, preserving input order.
    pub async fn adjudicate_all<S: AsRef<str>>(&self, words: &[S]) -> Vec<WordJudgement> {
        join_all(words.iter().map(|w| self.adjudicate(w.as_ref()))).await
    }

    async fn run_tiers(&self, word: &str) -> WordJudgement {
        // Tier 1: pattern
        if let Err(reason) = self.check_pattern(word) {
            return WordJudgement::new(word, Verdict::Invalid, Tier::Pattern).with_detail(reason);
        }

        // Tier 2: cache
        if let Some(valid) = self.cache.get(word, &self.language).await {
            return WordJudgement::new(word, Verdict::from_found(valid), Tier::Cache);
        }

        // Tier 3: local dictionary
        if let Some(dictionary) = &self.dictionary {
            if dictionary.contains(word) {
                self.cache.insert(word, &self.language, true).await;
                return WordJudgement::new(word, Verdict::Valid, Tier::LocalDictionary);
            }
            if letter_count(word) <= self.config.short_word_threshold {
                return WordJudgement::new(word, Verdict::Invalid, Tier::LocalDictionary)
                    .with_detail("not in local dictionary");
            }
        }

        // Tier 4: remote dictionary
        let mut detail = "no tier could confirm the word".to_string();
        if let Some(remote) = &self.remote {
            match self.lookup_remote(remote.as_ref(), word).await {
                Ok(found) => {
                    self.cache.insert(word, &self.language, found).await;
                    return WordJudgement::new(
                        word,
                        Verdict::from_found(found),
                        Tier::RemoteDictionary,
                    );
                }
                Err(e) => detail = format!("remote lookup failed: {}", e),
            }
        }

        // Tier 5: left for an arbiter, never cached
        WordJudgement::new(word, Verdict::NeedsArbitration, Tier::Arbiter).with_detail(detail)
    }

    /// Remote lookup with linearly growing per-attempt timeouts.
    async fn lookup_remote(
        &self,
        remote: &dyn RemoteDictionary,
        word: &str,
    ) -> Result<bool, RemoteLookupError> {
        let attempts = self.config.remote_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let timeout = self.config.attempt_timeout(attempt);
            let result = match tokio::time::timeout(timeout, remote.lookup(word, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(RemoteLookupError::Timeout(timeout)),
            };

            match result {
                Ok(found) => {
                    metrics::REMOTE_LOOKUPS
                        .with_label_values(&[remote.name(), if found { "found" } else { "not_found" }])
                        .inc();
                    return Ok(found);
                }
                Err(e) => {
                    metrics::REMOTE_LOOKUPS
                        .with_label_values(&[remote.name(), "error"])
                        .inc();
                    warn!(
                        word = %word,
                        backend = remote.name(),
                        attempt,
                        attempts,
                        error = %e,
                        "Remote dictionary lookup failed"
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.backoff()).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(RemoteLookupError::Protocol("no attempts made".to_string())))
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Valid => "valid",
        Verdict::Invalid => "invalid",
        Verdict::NeedsArbitration => "needs_arbitration",
    }
}
