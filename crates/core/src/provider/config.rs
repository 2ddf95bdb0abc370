//! Provider configuration and client construction.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::llm::{AnthropicClient, GeminiClient, LlmClient, OllamaClient, OpenAiCompatibleClient};
use super::ProviderError;

/// LLM backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenAI chat completions.
    #[serde(rename = "openai")]
    OpenAi,
    /// OpenRouter (OpenAI-compatible).
    #[serde(rename = "openrouter")]
    OpenRouter,
    /// Novita AI (OpenAI-compatible).
    Novita,
    /// Local Ollama instance.
    Ollama,
    /// Any OpenAI-compatible endpoint, e.g. LM Studio. Requires `api_base`.
    Custom,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Novita => "novita",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Custom => "custom",
        }
    }

    /// Base URL used when the config gives none.
    pub fn default_api_base(self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1"),
            ProviderKind::Novita => Some("https://api.novita.ai/v3/openai"),
            ProviderKind::Gemini => Some("https://generativelanguage.googleapis.com/v1beta"),
            ProviderKind::Anthropic | ProviderKind::Ollama | ProviderKind::Custom => None,
        }
    }

    /// Families whose API rejects unauthenticated calls outright.
    pub fn requires_api_key(self) -> bool {
        matches!(self, ProviderKind::Anthropic | ProviderKind::Gemini)
    }
}

/// One configured LLM endpoint, used for move providers and the arbiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique name; also the registration identity for tie-breaks.
    pub name: String,
    pub kind: ProviderKind,
    /// Model name/identifier.
    pub model: String,
    /// API key (can reference env var with ${VAR_NAME}).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// HTTP timeout for a single request in seconds. The turn deadline
    /// still applies on top.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    120
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            model: model.into(),
            api_key: None,
            api_base: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("provider name must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err(format!("provider '{}': model must not be empty", self.name));
        }
        if self.kind != ProviderKind::Ollama && self.api_key.is_none() && self.api_base.is_none()
        {
            return Err(format!(
                "provider '{}': {} requires api_key or api_base",
                self.name,
                self.kind.as_str()
            ));
        }
        if self.kind.requires_api_key() && self.api_key.is_none() {
            return Err(format!(
                "provider '{}': {} requires api_key",
                self.name,
                self.kind.as_str()
            ));
        }
        if self.kind == ProviderKind::Custom && self.api_base.is_none() {
            return Err(format!(
                "provider '{}': custom provider requires api_base",
                self.name
            ));
        }
        if self.max_tokens == 0 {
            return Err(format!(
                "provider '{}': max_tokens must be greater than 0",
                self.name
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(format!(
                "provider '{}': request_timeout_secs must be greater than 0",
                self.name
            ));
        }
        Ok(())
    }

    /// API key with `${VAR}` references resolved from the environment.
    pub fn resolved_api_key(&self) -> Result<Option<String>, ProviderError> {
        self.api_key
            .as_deref()
            .map(resolve_env_reference)
            .transpose()
    }

    /// Build the HTTP client for this endpoint.
    pub fn build_client(&self) -> Result<Arc<dyn LlmClient>, ProviderError> {
        let api_key = self.resolved_api_key()?;
        let timeout = self.request_timeout();

        let client: Arc<dyn LlmClient> = match self.kind {
            ProviderKind::Anthropic => {
                let key = api_key.ok_or_else(|| {
                    ProviderError::NotConfigured(format!("{}: missing api_key", self.name))
                })?;
                let mut client = AnthropicClient::new(key, &self.model).with_timeout(timeout);
                if let Some(base) = &self.api_base {
                    client = client.with_api_base(base);
                }
                Arc::new(client)
            }
            ProviderKind::Gemini => {
                let key = api_key.ok_or_else(|| {
                    ProviderError::NotConfigured(format!("{}: missing api_key", self.name))
                })?;
                let mut client = GeminiClient::new(key, &self.model).with_timeout(timeout);
                if let Some(base) = &self.api_base {
                    client = client.with_api_base(base);
                }
                Arc::new(client)
            }
            ProviderKind::Ollama => {
                let mut client = OllamaClient::new(&self.model).with_timeout(timeout);
                if let Some(base) = &self.api_base {
                    client = client.with_api_base(base);
                }
                Arc::new(client)
            }
            kind => {
                let base = self
                    .api_base
                    .as_deref()
                    .or(kind.default_api_base())
                    .ok_or_else(|| {
                        ProviderError::NotConfigured(format!("{}: missing api_base", self.name))
                    })?;
                let mut client =
                    OpenAiCompatibleClient::new(kind.as_str(), base, &self.model).with_timeout(timeout);
                if let Some(key) = api_key {
                    client = client.with_api_key(key);
                }
                Arc::new(client)
            }
        };
        Ok(client)
    }
}

/// Expand a whole-value `${VAR}` reference. Other strings pass through.
fn resolve_env_reference(raw: &str) -> Result<String, ProviderError> {
    match raw.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        Some(var) => std::env::var(var).map_err(|_| {
            ProviderError::NotConfigured(format!("environment variable {} is not set", var))
        }),
        None => Ok(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
name = "router"
kind = "openrouter"
model = "meta-llama/llama-3.1-70b-instruct"
api_key = "sk-or"
"#;
        let config: ProviderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.kind, ProviderKind::OpenRouter);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key_for_hosted() {
        let config = ProviderConfig::new("gpt", ProviderKind::OpenAi, "gpt-4o-mini");
        assert!(config.validate().unwrap_err().contains("requires api_key"));
        assert!(config.with_api_key("sk").validate().is_ok());
    }

    #[test]
    fn test_validate_custom_needs_base() {
        let config =
            ProviderConfig::new("studio", ProviderKind::Custom, "qwen").with_api_key("x");
        assert!(config.validate().is_err());
        let config = config.with_api_base("http://localhost:1234/v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ollama_needs_nothing() {
        assert!(ProviderConfig::new("local", ProviderKind::Ollama, "llama3")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_empty_model() {
        let config = ProviderConfig::new("local", ProviderKind::Ollama, " ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_env_reference() {
        std::env::set_var("TILERACE_TEST_PROVIDER_KEY", "sk-from-env");
        assert_eq!(
            resolve_env_reference("${TILERACE_TEST_PROVIDER_KEY}").unwrap(),
            "sk-from-env"
        );
        assert_eq!(resolve_env_reference("sk-literal").unwrap(), "sk-literal");
        assert!(resolve_env_reference("${TILERACE_TEST_MISSING_VAR}").is_err());
    }

    #[test]
    fn test_build_client_picks_family() {
        let client = ProviderConfig::new("router", ProviderKind::OpenRouter, "x/y")
            .with_api_key("sk")
            .build_client()
            .unwrap();
        assert_eq!(client.provider(), "openrouter");
        assert_eq!(client.model(), "x/y");

        let client = ProviderConfig::new("local", ProviderKind::Ollama, "llama3")
            .build_client()
            .unwrap();
        assert_eq!(client.provider(), "ollama");

        let client = ProviderConfig::new("gem", ProviderKind::Gemini, "gemini-2.5-flash")
            .with_api_key("AIza")
            .build_client()
            .unwrap();
        assert_eq!(client.provider(), "gemini");
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_gemini_needs_key() {
        let toml = r#"
name = "gem"
kind = "gemini"
model = "gemini-2.5-flash"
api_base = "http://proxy"
"#;
        let config: ProviderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.kind, ProviderKind::Gemini);
        assert!(config.validate().unwrap_err().contains("requires api_key"));
        assert!(matches!(
            config.build_client(),
            Err(ProviderError::NotConfigured(_))
        ));
        assert!(config.with_api_key("AIza").validate().is_ok());
    }

    #[test]
    fn test_build_anthropic_without_key_fails() {
        let config = ProviderConfig::new("claude", ProviderKind::Anthropic, "claude")
            .with_api_base("http://proxy");
        assert!(matches!(
            config.build_client(),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
