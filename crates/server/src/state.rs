use std::sync::Arc;
use tilerace_core::{Config, SanitizedConfig, TurnPipeline, ValidationCache};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<TurnPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<TurnPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &TurnPipeline {
        self.pipeline.as_ref()
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        self.pipeline.cache()
    }
}
