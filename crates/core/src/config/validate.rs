use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration.
///
/// Checks the server port, pipeline and cache bounds, the adjudicator
/// settings and every provider entry. Provider names must be unique.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if config.pipeline.turn_timeout_secs == 0 {
        return Err(invalid("pipeline.turn_timeout_secs must be greater than 0"));
    }
    if config.pipeline.variant_file.is_none()
        && crate::board::TileSet::builtin(&config.pipeline.variant).is_none()
    {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.variant {:?} is not a built-in variant",
            config.pipeline.variant
        )));
    }

    if config.cache.capacity == 0 {
        return Err(invalid("cache.capacity must be greater than 0"));
    }
    if config.cache.ttl_secs == 0 {
        return Err(invalid("cache.ttl_secs must be greater than 0"));
    }

    config
        .adjudicator
        .validate()
        .map_err(ConfigError::ValidationError)?;

    let mut names = HashSet::new();
    for provider in &config.providers {
        provider.validate().map_err(ConfigError::ValidationError)?;
        if !names.insert(provider.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate provider name {:?}",
                provider.name
            )));
        }
    }

    if let Some(arbiter) = &config.arbiter {
        arbiter
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("arbiter: {}", e)))?;
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, ServerConfig};
    use crate::provider::{ProviderConfig, ProviderKind};
    use std::net::IpAddr;

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig::new(name, ProviderKind::Ollama, "llama3")
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_capacity_fails() {
        let mut config = Config::default();
        config.cache.capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_variant_fails() {
        let config = load_config_from_str("[pipeline]\nvariant = \"klingon\"\n").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_validate_duplicate_provider_names() {
        let config = Config {
            providers: vec![provider("a"), provider("b"), provider("a")],
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate provider name"));
    }

    #[test]
    fn test_validate_hosted_provider_needs_key_or_base() {
        let config = Config {
            providers: vec![ProviderConfig::new(
                "claude",
                ProviderKind::Anthropic,
                "claude-3-5-haiku-latest",
            )],
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_adjudicator_threshold() {
        let mut config = Config::default();
        config.adjudicator.short_word_threshold = 0;
        assert!(validate_config(&config).is_err());
    }
}
