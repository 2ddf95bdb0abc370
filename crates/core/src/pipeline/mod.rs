//! Turn pipeline: race every provider, evaluate what comes back, pick a winner.
//!
//! ```text
//! snapshot ─► Dispatcher ─► N provider tasks ─► raw text
//!                                   │ (completion order)
//!                                   ▼
//!                          CandidateEvaluator ─► ProviderResult ─► progress
//!                                   │
//!                      (all settled or deadline)
//!                                   ▼
//!                          select_winner ─► TurnReport
//! ```
//!
//! The pipeline never touches the caller's authoritative board. A committed
//! move tells the caller what to place; applying it, consuming premiums and
//! refilling racks is the caller's job.

mod dispatcher;
mod evaluator;
mod selector;
mod types;

pub use dispatcher::{Dispatch, Dispatcher, ProviderOutcome};
pub use evaluator::CandidateEvaluator;
pub use selector::{no_move_reason, select_winner};
pub use types::{CommittedMove, ProviderResult, ProviderStatus, TurnOutcome, TurnReport};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adjudicator::{
    DictionaryError, JulsDictionary, LlmArbiter, LocalDictionary, TieredAdjudicator,
    ValidationCache, WordArbiter,
};
use crate::board::{BoardError, PremiumLayout, TileSet};
use crate::config::{Config, RemoteBackend};
use crate::metrics;
use crate::provider::{create_providers, MoveProvider, ProposalRequest, ProviderError};
use crate::scoring::ScoringRules;
use crate::snapshot::{SnapshotError, StateSnapshot};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("No providers configured")]
    NoProviders,

    #[error("Board setup error: {0}")]
    Board(#[from] BoardError),

    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Provider setup error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Everything needed to evaluate turns for one game variant.
pub struct TurnPipeline {
    adjudicator: TieredAdjudicator,
    arbiter: Option<Arc<dyn WordArbiter>>,
    providers: Vec<Arc<dyn MoveProvider>>,
    layout: PremiumLayout,
    tiles: TileSet,
    rules: ScoringRules,
    turn_timeout: Duration,
}

impl TurnPipeline {
    /// Standard English board with a 60 second turn deadline.
    pub fn new(adjudicator: TieredAdjudicator, providers: Vec<Arc<dyn MoveProvider>>) -> Self {
        Self {
            adjudicator,
            arbiter: None,
            providers,
            layout: PremiumLayout::standard(),
            tiles: TileSet::english(),
            rules: ScoringRules::default(),
            turn_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_arbiter(mut self, arbiter: Arc<dyn WordArbiter>) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    pub fn with_layout(mut self, layout: PremiumLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_tiles(mut self, tiles: TileSet) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Build every collaborator from config. `cache` is shared with whoever
    /// else needs it (e.g. a stats endpoint).
    pub fn from_config(config: &Config, cache: Arc<ValidationCache>) -> Result<Self, PipelineError> {
        let pipeline_config = &config.pipeline;

        let tiles = match &pipeline_config.variant_file {
            Some(path) => TileSet::from_json_file(path)?,
            None => TileSet::builtin(&pipeline_config.variant).ok_or_else(|| {
                PipelineError::Config(format!("unknown variant '{}'", pipeline_config.variant))
            })?,
        };
        let layout = match &pipeline_config.premium_layout_file {
            Some(path) => PremiumLayout::from_json_file(path)?,
            None => PremiumLayout::standard(),
        };
        let language = tiles.language().to_string();

        let mut adjudicator = TieredAdjudicator::new(cache, language.clone())
            .with_config(config.adjudicator.clone());
        if let Some(dictionary) = &config.dictionary {
            let dict = LocalDictionary::load(language.clone(), &dictionary.path)?;
            adjudicator = adjudicator.with_dictionary(Arc::new(dict));
        }
        if let Some(remote) = &config.remote_dictionary {
            match remote.backend {
                RemoteBackend::Juls => {
                    let mut juls = JulsDictionary::new();
                    if let Some(url) = &remote.url {
                        juls = juls.with_base_url(url);
                    }
                    adjudicator = adjudicator.with_remote(Arc::new(juls));
                }
            }
        }

        let providers = create_providers(&config.providers)?;
        let mut pipeline = Self::new(adjudicator, providers)
            .with_layout(layout)
            .with_tiles(tiles)
            .with_rules(ScoringRules {
                bingo_bonus: pipeline_config.bingo_bonus,
                bingo_tiles: pipeline_config.bingo_tiles,
            })
            .with_turn_timeout(Duration::from_secs(pipeline_config.turn_timeout_secs));

        if let Some(arbiter) = &config.arbiter {
            let client = arbiter.build_client()?;
            pipeline = pipeline.with_arbiter(Arc::new(
                LlmArbiter::new(client)
                    .with_max_tokens(arbiter.max_tokens)
                    .with_temperature(arbiter.temperature),
            ));
        }

        info!(
            variant = pipeline.tiles.name(),
            language = %language,
            providers = pipeline.providers.len(),
            arbiter = pipeline.arbiter.is_some(),
            "Turn pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn providers(&self) -> &[Arc<dyn MoveProvider>] {
        &self.providers
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        self.adjudicator.cache()
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn layout(&self) -> &PremiumLayout {
        &self.layout
    }

    pub fn turn_timeout(&self) -> Duration {
        self.turn_timeout
    }

    /// Evaluate a turn with the registered providers.
    pub async fn evaluate_turn(&self, snapshot: &StateSnapshot) -> Result<TurnReport, PipelineError> {
        self.evaluate_turn_with(snapshot, &self.providers, None).await
    }

    /// Like [`evaluate_turn`](Self::evaluate_turn), streaming a `Pending`
    /// notice per provider at launch and then each terminal result as it
    /// settles.
    pub async fn evaluate_turn_with_progress(
        &self,
        snapshot: &StateSnapshot,
        progress: mpsc::Sender<ProviderResult>,
    ) -> Result<TurnReport, PipelineError> {
        self.evaluate_turn_with(snapshot, &self.providers, Some(progress))
            .await
    }

    /// Evaluate a turn with an explicit provider list. Order in `providers`
    /// is registration order for tie-breaks.
    pub async fn evaluate_turn_with(
        &self,
        snapshot: &StateSnapshot,
        providers: &[Arc<dyn MoveProvider>],
        progress: Option<mpsc::Sender<ProviderResult>>,
    ) -> Result<TurnReport, PipelineError> {
        if providers.is_empty() {
            return Err(PipelineError::NoProviders);
        }
        snapshot.validate(self.layout.size())?;
        let board = snapshot.to_board(&self.layout)?;
        let rack = snapshot.rack()?;

        let turn_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        info!(
            turn_id = %turn_id,
            providers = providers.len(),
            rack = %rack,
            "Evaluating turn"
        );

        let request = Arc::new(ProposalRequest {
            turn_id,
            snapshot: snapshot.clone(),
            language: self.tiles.language().to_string(),
            tile_summary: self.tiles.summary(),
            premium_summary: self.layout.summary(),
        });

        for (index, provider) in providers.iter().enumerate() {
            notify(&progress, ProviderResult::pending(provider.name(), index));
        }

        let mut dispatch = Dispatcher::new(providers.to_vec(), self.turn_timeout).launch(request);
        let deadline = dispatch.deadline();
        let evaluator = CandidateEvaluator {
            board: &board,
            rack: &rack,
            tiles: &self.tiles,
            rules: &self.rules,
            adjudicator: &self.adjudicator,
            arbiter: self.arbiter.as_deref(),
        };
        let evaluator = &evaluator;

        let mut results: Vec<Option<ProviderResult>> = vec![None; providers.len()];
        let mut evaluating = FuturesUnordered::new();
        let mut dispatching = true;

        // Candidates are evaluated concurrently, under the same deadline as
        // the provider calls.
        while dispatching || !evaluating.is_empty() {
            let settled = tokio::select! {
                outcome = dispatch.next(), if dispatching => {
                    let Some(outcome) = outcome else {
                        dispatching = false;
                        continue;
                    };
                    let mut result = ProviderResult::pending(outcome.provider, outcome.index);
                    result.elapsed_ms = outcome.elapsed.as_millis() as u64;
                    match outcome.reply {
                        Ok(reply) => {
                            result.usage = reply.usage;
                            result.raw_text = Some(reply.text.clone());
                            evaluating.push(async move { evaluator.evaluate(result, &reply.text).await });
                            continue;
                        }
                        Err(e) => {
                            warn!(provider = %result.provider, error = %e, "Provider call failed");
                            result.fail(ProviderStatus::ProviderError, e.to_string())
                        }
                    }
                }
                Some(result) = evaluating.next(), if !evaluating.is_empty() => result,
                _ = tokio::time::sleep_until(deadline) => break,
            };

            record(&settled);
            notify(&progress, settled.clone());
            let index = settled.index;
            results[index] = Some(settled);
        }
        drop(evaluating);

        for (index, name) in dispatch.cancel_outstanding() {
            let result = self.timed_out(name, index, "no answer");
            notify(&progress, result.clone());
            results[index] = Some(result);
        }
        for (index, provider) in providers.iter().enumerate() {
            if results[index].is_none() {
                let result = self.timed_out(provider.name().to_string(), index, "evaluation unfinished");
                notify(&progress, result.clone());
                results[index] = Some(result);
            }
        }

        let results: Vec<ProviderResult> = results.into_iter().flatten().collect();

        // Evaluated results always carry a candidate and a score.
        let committed = select_winner(&results).and_then(|winner| {
            let candidate = winner.candidate.as_ref()?;
            Some(CommittedMove {
                provider: winner.provider.clone(),
                placements: candidate.placements.clone(),
                words: winner.words.iter().map(|j| j.word.clone()).collect(),
                score: winner.score.clone()?,
                remaining_rack: rack.consume(&candidate.placements).to_string(),
            })
        });

        let outcome = match committed {
            Some(m) => TurnOutcome::Committed(m),
            None => TurnOutcome::NoMove {
                reason: no_move_reason(&results),
            },
        };

        let elapsed = started.elapsed();
        metrics::TURN_DURATION.observe(elapsed.as_secs_f64());
        metrics::TURN_OUTCOMES
            .with_label_values(&[outcome.as_str()])
            .inc();

        match &outcome {
            TurnOutcome::Committed(m) => info!(
                turn_id = %turn_id,
                provider = %m.provider,
                score = m.score.total,
                words = ?m.words,
                duration_ms = elapsed.as_millis() as u64,
                "Turn committed"
            ),
            TurnOutcome::NoMove { reason } => info!(
                turn_id = %turn_id,
                reason = %reason,
                duration_ms = elapsed.as_millis() as u64,
                "Turn produced no move"
            ),
        }

        Ok(TurnReport {
            turn_id,
            started_at,
            duration_ms: elapsed.as_millis() as u64,
            outcome,
            results,
        })
    }
}

impl TurnPipeline {
    fn timed_out(&self, provider: String, index: usize, what: &str) -> ProviderResult {
        let mut result = ProviderResult::pending(provider, index).fail(
            ProviderStatus::TimedOut,
            format!("{} within {:?}", what, self.turn_timeout),
        );
        result.elapsed_ms = self.turn_timeout.as_millis() as u64;
        record(&result);
        result
    }
}

fn record(result: &ProviderResult) {
    metrics::PROVIDER_RESULTS
        .with_label_values(&[result.provider.as_str(), result.status.as_str()])
        .inc();
    info!(
        provider = %result.provider,
        status = %result.status,
        score = ?result.total(),
        elapsed_ms = result.elapsed_ms,
        "Provider settled"
    );
}

fn notify(progress: &Option<mpsc::Sender<ProviderResult>>, result: ProviderResult) {
    let Some(tx) = progress else {
        return;
    };
    // The turn never waits on a slow listener.
    match tx.try_send(result) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(result)) => debug!(
            provider = %result.provider,
            status = %result.status,
            "Progress listener is full, dropping update"
        ),
        // A dropped receiver only means nobody is listening.
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}
