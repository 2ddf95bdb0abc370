//! Final tier: an external arbiter rules on words no dictionary could confirm.
//!
//! Rulings are per-turn opinions and are never written to the cache.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::types::{Tier, Verdict, WordJudgement};
use crate::metrics;
use crate::provider::llm::{CompletionRequest, LlmClient, LlmError};
use crate::provider::parse::extract_json;
use crate::text::normalize_word;

#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Unparseable ruling: {0}")]
    Parse(String),
}

/// One word's ruling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterRuling {
    pub word: String,
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Something that can rule on a batch of words.
#[async_trait]
pub trait WordArbiter: Send + Sync {
    fn name(&self) -> &str;

    /// Rule on `words` in `language`. Words missing from the answer are
    /// treated as invalid by the caller.
    async fn judge(
        &self,
        words: &[String],
        language: &str,
    ) -> Result<Vec<ArbiterRuling>, ArbiterError>;
}

// ============================================================================
// LLM-backed arbiter
// ============================================================================

const ARBITER_SYSTEM_PROMPT: &str = r#"You are the word judge for a crossword tile game.

For every word you are given, decide whether it is an acceptable dictionary word in the stated language. Inflected forms count; proper nouns, abbreviations and made-up words do not.

Respond with a JSON object only:
{"results": [{"word": "WORD", "valid": true, "reason": "short explanation"}]}

Include every word exactly once."#;

#[derive(Debug, Deserialize)]
struct RulingEnvelope {
    results: Vec<ArbiterRuling>,
}

/// Arbiter asking an LLM to rule on all pending words in one request.
pub struct LlmArbiter {
    client: Arc<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmArbiter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: 512,
            temperature: 0.0,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_prompt(words: &[String], language: &str) -> String {
        let list = words
            .iter()
            .map(|w| format!("- {}", w))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Language: {}\n\nWords:\n{}", language, list)
    }

    fn parse_response(text: &str) -> Result<Vec<ArbiterRuling>, ArbiterError> {
        let value = extract_json(text)
            .ok_or_else(|| ArbiterError::Parse("no JSON object in response".to_string()))?;
        let envelope: RulingEnvelope =
            serde_json::from_value(value).map_err(|e| ArbiterError::Parse(e.to_string()))?;
        Ok(envelope.results)
    }
}

#[async_trait]
impl WordArbiter for LlmArbiter {
    fn name(&self) -> &str {
        self.client.model()
    }

    async fn judge(
        &self,
        words: &[String],
        language: &str,
    ) -> Result<Vec<ArbiterRuling>, ArbiterError> {
        let request = CompletionRequest::new(Self::build_prompt(words, language))
            .with_system(ARBITER_SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let response = self.client.complete(request).await?;
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Arbiter responded"
        );
        Self::parse_response(&response.text)
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Send every `NeedsArbitration` judgement to `arbiter` and overwrite it with
/// the ruling. Returns how many judgements were resolved.
///
/// On arbiter failure the judgements are left untouched.
pub async fn resolve_with_arbiter(
    judgements: &mut [WordJudgement],
    arbiter: &dyn WordArbiter,
    language: &str,
) -> Result<usize, ArbiterError> {
    let mut pending: Vec<String> = Vec::new();
    for j in judgements.iter() {
        if j.verdict == Verdict::NeedsArbitration && !pending.contains(&j.word) {
            pending.push(j.word.clone());
        }
    }
    if pending.is_empty() {
        return Ok(0);
    }

    let rulings = arbiter.judge(&pending, language).await?;
    let by_word: HashMap<String, ArbiterRuling> = rulings
        .into_iter()
        .map(|r| (normalize_word(&r.word), r))
        .collect();

    let mut resolved = 0;
    for j in judgements
        .iter_mut()
        .filter(|j| j.verdict == Verdict::NeedsArbitration)
    {
        let (verdict, detail) = match by_word.get(&j.word) {
            Some(ruling) => (
                Verdict::from_found(ruling.valid),
                ruling.reason.clone().unwrap_or_default(),
            ),
            None => (Verdict::Invalid, "arbiter gave no ruling".to_string()),
        };
        j.verdict = verdict;
        j.tier = Tier::Arbiter;
        j.detail = (!detail.is_empty()).then_some(detail);
        metrics::ADJUDICATIONS
            .with_label_values(&[Tier::Arbiter.as_str(), if verdict.is_valid() { "valid" } else { "invalid" }])
            .inc();
        resolved += 1;
    }

    info!(
        arbiter = arbiter.name(),
        words = pending.len(),
        resolved,
        "Arbiter ruled on pending words"
    );
    Ok(resolved)
}
