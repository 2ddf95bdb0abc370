//! Move providers: the agents racing to propose a move each turn.
//!
//! A provider turns a [`ProposalRequest`] into raw text. Parsing and every
//! later stage happen in the pipeline, so a provider only has to talk to its
//! backend.

pub mod config;
pub mod llm;
pub mod parse;
mod prompt;

pub use config::{ProviderConfig, ProviderKind};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError,
    LlmUsage, OllamaClient, OpenAiCompatibleClient,
};
pub use parse::{
    extract_json, parse_candidate, MoveAction, MoveCandidate, ParseError, ParseMethod,
    ParsedCandidate,
};
pub use prompt::{system_prompt, user_prompt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::metrics;
use crate::snapshot::StateSnapshot;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider failed: {0}")]
    Failed(String),
}

/// Everything a provider sees for one turn. Shared read-only by all
/// provider tasks.
#[derive(Debug, Clone)]
pub struct ProposalRequest {
    pub turn_id: Uuid,
    pub snapshot: StateSnapshot,
    /// Language of the active tile variant.
    pub language: String,
    /// `letter:count(points)` listing of the variant.
    pub tile_summary: String,
    /// Premium cells still in play, one line per kind.
    pub premium_summary: String,
}

/// Raw answer of a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A move-proposing agent.
#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Registration name, unique within a pipeline.
    fn name(&self) -> &str;

    /// Produce a move proposal. Must be cancel-safe: the pipeline drops the
    /// future when the turn deadline passes.
    async fn propose(&self, request: &ProposalRequest) -> Result<ProviderReply, ProviderError>;
}

// ============================================================================
// LLM-backed provider
// ============================================================================

/// Provider that asks an LLM for a JSON move.
pub struct LlmMoveProvider {
    name: String,
    client: Arc<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmMoveProvider {
    pub fn new(name: impl Into<String>, client: Arc<dyn LlmClient>) -> Self {
        Self {
            name: name.into(),
            client,
            max_tokens: 1024,
            temperature: 0.7,
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

    /// Build from config, resolving the API key and picking the client family.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(config.name.clone(), config.build_client()?)
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature))
    }
}

#[async_trait]
impl MoveProvider for LlmMoveProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&self, request: &ProposalRequest) -> Result<ProviderReply, ProviderError> {
        let completion = CompletionRequest::new(user_prompt(request))
            .with_system(system_prompt(request))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let response = self.client.complete(completion).await?;

        metrics::LLM_TOKENS
            .with_label_values(&[&self.name, "input"])
            .inc_by(response.usage.input_tokens as u64);
        metrics::LLM_TOKENS
            .with_label_values(&[&self.name, "output"])
            .inc_by(response.usage.output_tokens as u64);
        debug!(
            provider = %self.name,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Provider responded"
        );

        Ok(ProviderReply {
            text: response.text,
            usage: Some(response.usage),
            model: Some(response.model),
        })
    }
}

/// Build the configured providers in registration order.
pub fn create_providers(
    configs: &[ProviderConfig],
) -> Result<Vec<Arc<dyn MoveProvider>>, ProviderError> {
    configs
        .iter()
        .map(|c| LlmMoveProvider::from_config(c).map(|p| Arc::new(p) as Arc<dyn MoveProvider>))
        .collect()
}
