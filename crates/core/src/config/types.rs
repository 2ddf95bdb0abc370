use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::adjudicator::AdjudicatorConfig;
use crate::provider::{ProviderConfig, ProviderKind};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub adjudicator: AdjudicatorConfig,
    /// Local word list (optional; without it every word misses tier 3)
    #[serde(default)]
    pub dictionary: Option<DictionaryConfig>,
    /// Remote dictionary for long words (optional)
    #[serde(default)]
    pub remote_dictionary: Option<RemoteDictionaryConfig>,
    /// LLM consulted for words the tiers could not confirm (optional)
    #[serde(default)]
    pub arbiter: Option<ProviderConfig>,
    /// Move providers, in registration order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Turn pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Shared deadline for all providers in a turn, in seconds
    #[serde(default = "default_turn_timeout")]
    pub turn_timeout_secs: u64,
    /// Points for playing the whole rack
    #[serde(default = "default_bingo_bonus")]
    pub bingo_bonus: u32,
    /// Tiles a move must place to earn the bonus
    #[serde(default = "default_bingo_tiles")]
    pub bingo_tiles: usize,
    /// Built-in tile variant ("english" or "slovak")
    #[serde(default = "default_variant")]
    pub variant: String,
    /// Variant definition file; overrides `variant` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_file: Option<PathBuf>,
    /// Premium layout JSON file; the standard layout is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_layout_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            turn_timeout_secs: default_turn_timeout(),
            bingo_bonus: default_bingo_bonus(),
            bingo_tiles: default_bingo_tiles(),
            variant: default_variant(),
            variant_file: None,
            premium_layout_file: None,
        }
    }
}

fn default_turn_timeout() -> u64 {
    60
}

fn default_bingo_bonus() -> u32 {
    50
}

fn default_bingo_tiles() -> usize {
    7
}

fn default_variant() -> String {
    "english".to_string()
}

/// Word validity cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum entries before eviction
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

/// Local dictionary configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DictionaryConfig {
    /// Word list, one word per line, `#` comments allowed
    pub path: PathBuf,
}

/// Remote dictionary backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteBackend {
    /// JULS Slovak dictionary portal
    Juls,
}

/// Remote dictionary configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteDictionaryConfig {
    pub backend: RemoteBackend,
    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
    pub adjudicator: AdjudicatorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<DictionaryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_dictionary: Option<RemoteDictionaryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arbiter: Option<SanitizedProviderConfig>,
    pub providers: Vec<SanitizedProviderConfig>,
}

/// Provider config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&ProviderConfig> for SanitizedProviderConfig {
    fn from(p: &ProviderConfig) -> Self {
        Self {
            name: p.name.clone(),
            kind: p.kind,
            model: p.model.clone(),
            api_key_configured: p.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            api_base: p.api_base.clone(),
            max_tokens: p.max_tokens,
            temperature: p.temperature,
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            pipeline: config.pipeline.clone(),
            cache: config.cache.clone(),
            adjudicator: config.adjudicator.clone(),
            dictionary: config.dictionary.clone(),
            remote_dictionary: config.remote_dictionary.clone(),
            arbiter: config.arbiter.as_ref().map(SanitizedProviderConfig::from),
            providers: config
                .providers
                .iter()
                .map(SanitizedProviderConfig::from)
                .collect(),
        }
    }
}
