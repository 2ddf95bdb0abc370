pub mod adjudicator;
pub mod board;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod provider;
pub mod rules;
pub mod scoring;
pub mod snapshot;
pub mod testing;
pub mod text;
pub mod words;

pub use adjudicator::{
    AdjudicatorConfig, CacheStats, LocalDictionary, TieredAdjudicator, ValidationCache, Verdict,
    WordArbiter, WordJudgement,
};
pub use board::{Axis, Board, Placement, PremiumLayout, Rack, TileSet};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use pipeline::{
    CommittedMove, PipelineError, ProviderResult, ProviderStatus, TurnOutcome, TurnPipeline,
    TurnReport,
};
pub use provider::{MoveProvider, ProposalRequest, ProviderConfig, ProviderKind};
pub use scoring::{MoveScore, ScoringRules};
pub use snapshot::StateSnapshot;
