//! Turn pipeline integration tests.
//!
//! These tests drive whole turns through the pipeline with scripted providers:
//! - Scoring and committing the best candidate
//! - Isolation of slow, failing and panicking providers
//! - Deterministic tie-breaks
//! - Progress streaming
//! - Building a pipeline from configuration

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use tilerace_core::{
    board::Axis,
    load_config_from_str,
    pipeline::PipelineError,
    provider::{LlmMoveProvider, ParseMethod, ProviderError, ProviderReply},
    testing::{fixtures, MockLlmClient, MockProvider, MockRemoteDictionary},
    AdjudicatorConfig, MoveProvider, ProposalRequest, ProviderStatus, TurnOutcome, TurnPipeline,
    ValidationCache,
};

fn cat_json() -> String {
    fixtures::move_json(&[(7, 7, "C"), (7, 8, "A"), (7, 9, "T")])
}

fn provider(p: MockProvider) -> Arc<dyn MoveProvider> {
    Arc::new(p)
}

/// Provider that panics mid-call.
struct PanickingProvider;

#[async_trait]
impl MoveProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicky"
    }

    async fn propose(&self, _request: &ProposalRequest) -> Result<ProviderReply, ProviderError> {
        panic!("provider blew up");
    }
}

#[tokio::test]
async fn test_cat_on_empty_board_is_committed() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![provider(MockProvider::new("solo").with_response(cat_json()))],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("C A T ? ? ? ?"))
        .await
        .unwrap();

    let committed = report.outcome.committed().expect("move should be committed");
    assert_eq!(committed.provider, "solo");
    assert_eq!(committed.score.total, 10);
    assert_eq!(committed.words, vec!["CAT".to_string()]);
    assert_eq!(committed.placements.len(), 3);
    assert_eq!(committed.remaining_rack, "? ? ? ?");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, ProviderStatus::Evaluated);
}

#[tokio::test]
async fn test_rule_invalid_candidate_loses_to_valid_one() {
    let off_center = fixtures::move_json(&[(0, 0, "C"), (0, 1, "A"), (0, 2, "T")]);
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            provider(MockProvider::new("wild").with_response(off_center)),
            provider(MockProvider::new("careful").with_response(cat_json())),
        ],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("CAT"))
        .await
        .unwrap();

    assert_eq!(report.outcome.committed().unwrap().provider, "careful");
    let wild = report.result_for("wild").unwrap();
    assert_eq!(wild.status, ProviderStatus::RuleInvalid);
    assert_eq!(wild.error.as_deref(), Some("first_move_must_cover_center"));
}

#[tokio::test]
async fn test_higher_score_wins_regardless_of_arrival() {
    // CAT (10) arrives first; TACT (12) arrives later.
    let tact = fixtures::move_json(&[(7, 7, "T"), (7, 8, "A"), (7, 9, "C"), (7, 10, "T")]);
    let pipeline = fixtures::pipeline(
        &["CAT", "TACT"],
        vec![
            provider(MockProvider::new("fast").with_response(cat_json())),
            provider(
                MockProvider::new("slow")
                    .with_response(tact)
                    .with_delay(Duration::from_millis(100)),
            ),
        ],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("T A C T"))
        .await
        .unwrap();

    let committed = report.outcome.committed().unwrap();
    assert_eq!(committed.provider, "slow");
    assert_eq!(committed.score.total, 12);
}

#[tokio::test]
async fn test_slow_provider_times_out_without_blocking_turn() {
    let slow = Arc::new(MockProvider::new("slow").with_delay(Duration::from_secs(30)));
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            slow.clone() as Arc<dyn MoveProvider>,
            provider(MockProvider::new("quick").with_response(cat_json())),
        ],
    )
    .with_turn_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("CAT"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(slow.calls(), 1);
    assert_eq!(report.outcome.committed().unwrap().provider, "quick");
    assert_eq!(
        report.result_for("slow").unwrap().status,
        ProviderStatus::TimedOut
    );
    // Results stay in registration order.
    assert_eq!(report.results[0].provider, "slow");
    assert_eq!(report.results[1].provider, "quick");
}

#[tokio::test]
async fn test_equal_scores_go_to_first_registered() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            provider(
                MockProvider::new("first")
                    .with_response(cat_json())
                    .with_delay(Duration::from_millis(100)),
            ),
            provider(MockProvider::new("second").with_response(cat_json())),
        ],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("CAT"))
        .await
        .unwrap();

    assert_eq!(report.outcome.committed().unwrap().provider, "first");
    assert_eq!(report.result_for("second").unwrap().total(), Some(10));
}

#[tokio::test]
async fn test_failures_are_isolated_per_provider() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            Arc::new(PanickingProvider) as Arc<dyn MoveProvider>,
            provider(MockProvider::new("down").failing("connection refused")),
            provider(MockProvider::new("chatty").with_response("I would rather not.")),
            provider(MockProvider::new("good").with_response(cat_json())),
        ],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("CAT"))
        .await
        .unwrap();

    assert_eq!(report.outcome.committed().unwrap().provider, "good");
    assert_eq!(
        report.result_for("panicky").unwrap().status,
        ProviderStatus::ProviderError
    );
    let down = report.result_for("down").unwrap();
    assert_eq!(down.status, ProviderStatus::ProviderError);
    assert!(down.error.as_ref().unwrap().contains("connection refused"));
    assert_eq!(
        report.result_for("chatty").unwrap().status,
        ProviderStatus::ParseError
    );
}

#[tokio::test]
async fn test_no_valid_candidate_is_no_move() {
    let pipeline = fixtures::pipeline(
        &["DOG"],
        vec![
            provider(MockProvider::new("a").with_response(cat_json())),
            provider(MockProvider::new("b").with_response(r#"{"pass": true}"#)),
        ],
    );

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("CAT"))
        .await
        .unwrap();

    match &report.outcome {
        TurnOutcome::NoMove { reason } => {
            assert!(reason.contains("a: judge_invalid"));
            assert!(reason.contains("b: parsed_ok"));
        }
        other => panic!("expected no move, got {:?}", other),
    }
    assert_eq!(report.result_for("a").unwrap().status, ProviderStatus::JudgeInvalid);
    assert_eq!(report.result_for("b").unwrap().status, ProviderStatus::ParsedOk);
}

#[tokio::test]
async fn test_hook_onto_existing_word() {
    let cats = fixtures::move_json(&[(7, 10, "S")]);
    let pipeline = fixtures::pipeline(
        &["CAT", "CATS"],
        vec![provider(MockProvider::new("p").with_response(cats))],
    );
    let snapshot = fixtures::snapshot_with_word(7, 7, Axis::Across, "CAT", "S E");

    let report = pipeline.evaluate_turn(&snapshot).await.unwrap();

    let committed = report.outcome.committed().unwrap();
    assert_eq!(committed.words, vec!["CATS".to_string()]);
    assert_eq!(committed.score.total, 6);
    assert_eq!(committed.remaining_rack, "E");
}

#[tokio::test]
async fn test_progress_streams_pending_then_terminal() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            provider(
                MockProvider::new("a")
                    .with_response(cat_json())
                    .with_delay(Duration::from_millis(50)),
            ),
            provider(MockProvider::new("b").with_response("garbage")),
        ],
    );
    let (tx, mut rx) = mpsc::channel(16);

    let report = pipeline
        .evaluate_turn_with_progress(&fixtures::empty_snapshot("CAT"), tx)
        .await
        .unwrap();

    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }

    assert_eq!(updates.len(), 4);
    assert!(updates[..2]
        .iter()
        .all(|u| u.status == ProviderStatus::Pending));
    // "b" answers first.
    assert_eq!(updates[2].provider, "b");
    assert_eq!(updates[2].status, ProviderStatus::ParseError);
    assert_eq!(updates[3].provider, "a");
    assert_eq!(updates[3].status, ProviderStatus::Evaluated);
    assert_eq!(report.outcome.committed().unwrap().provider, "a");
}

#[tokio::test]
async fn test_slow_lookup_does_not_hold_back_other_providers() {
    // DOGS is long enough to need the remote dictionary, which never answers in time.
    let remote = Arc::new(MockRemoteDictionary::new());
    remote.set_delay(Duration::from_secs(5)).await;
    let adjudicator = fixtures::adjudicator(&["CAT"])
        .with_remote(remote.clone())
        .with_config(AdjudicatorConfig {
            short_word_threshold: 3,
            remote_attempts: 3,
            remote_timeout_ms: 500,
            remote_backoff_ms: 250,
            ..Default::default()
        });
    let dogs = fixtures::move_json(&[(7, 7, "D"), (7, 8, "O"), (7, 9, "G"), (7, 10, "S")]);
    let pipeline = Arc::new(
        TurnPipeline::new(
            adjudicator,
            vec![
                provider(MockProvider::new("long").with_response(dogs)),
                provider(
                    MockProvider::new("cat")
                        .with_response(cat_json())
                        .with_delay(Duration::from_millis(50)),
                ),
            ],
        )
        .with_turn_timeout(Duration::from_millis(200)),
    );

    let (tx, mut rx) = mpsc::channel(16);
    let started = Instant::now();
    let turn = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move {
            pipeline
                .evaluate_turn_with_progress(&fixtures::empty_snapshot("D O G S C A T"), tx)
                .await
        }
    });

    let mut cat_settled_at = None;
    while let Some(update) = rx.recv().await {
        if update.provider == "cat" && update.status.is_terminal() {
            cat_settled_at = Some(started.elapsed());
        }
    }
    let report = turn.await.unwrap().unwrap();
    let total = started.elapsed();

    assert!(cat_settled_at.unwrap() < Duration::from_millis(180));
    assert!(total < Duration::from_millis(450), "turn took {:?}", total);
    assert_eq!(report.results[0].status, ProviderStatus::TimedOut);
    assert_eq!(report.results[1].status, ProviderStatus::Evaluated);
    assert_eq!(report.outcome.committed().unwrap().provider, "cat");
}

#[tokio::test]
async fn test_slow_progress_listener_does_not_block_turn() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![
            provider(MockProvider::new("a").with_response(cat_json())),
            provider(MockProvider::new("b").with_response(cat_json())),
        ],
    );
    // Room for one update and nobody reading until the turn is over.
    let (tx, mut rx) = mpsc::channel(1);

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        pipeline.evaluate_turn_with_progress(&fixtures::empty_snapshot("CAT"), tx),
    )
    .await
    .expect("turn blocked on the progress listener")
    .unwrap();

    assert_eq!(report.outcome.committed().unwrap().provider, "a");
    let first = rx.recv().await.unwrap();
    assert_eq!(first.status, ProviderStatus::Pending);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_llm_provider_end_to_end() {
    let reply = format!("Here is my move:\n```json\n{}\n```", cat_json());
    let client = Arc::new(MockLlmClient::new(reply));
    let llm: Arc<dyn MoveProvider> = Arc::new(LlmMoveProvider::new("llm", client.clone()));
    let pipeline = fixtures::pipeline(&["CAT"], vec![llm]);

    let report = pipeline
        .evaluate_turn(&fixtures::empty_snapshot("C A T E"))
        .await
        .unwrap();

    let result = report.result_for("llm").unwrap();
    assert_eq!(result.status, ProviderStatus::Evaluated);
    assert_eq!(result.parse_method, Some(ParseMethod::Fenced));
    assert!(result.usage.is_some());

    let requests = client.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Rack: C A T E"));
    assert!(requests[0].system.is_some());
}

#[tokio::test]
async fn test_invalid_snapshot_is_rejected() {
    let pipeline = fixtures::pipeline(
        &["CAT"],
        vec![provider(MockProvider::new("p").with_response(cat_json()))],
    );
    let mut snapshot = fixtures::empty_snapshot("CAT");
    snapshot.grid.pop();

    let result = pipeline.evaluate_turn(&snapshot).await;
    assert!(matches!(result, Err(PipelineError::Snapshot(_))));
}

#[tokio::test]
async fn test_no_providers_is_an_error() {
    let pipeline = fixtures::pipeline(&["CAT"], Vec::new());
    let result = pipeline.evaluate_turn(&fixtures::empty_snapshot("CAT")).await;
    assert!(matches!(result, Err(PipelineError::NoProviders)));
}

#[tokio::test]
async fn test_pipeline_from_config() -> anyhow::Result<()> {
    let mut words = NamedTempFile::new()?;
    writeln!(words, "cat\ndog\n# comment")?;

    let toml = format!(
        r#"
[pipeline]
turn_timeout_secs = 15

[dictionary]
path = "{}"

[[providers]]
name = "local"
kind = "ollama"
model = "llama3"
"#,
        words.path().display()
    );
    let config = load_config_from_str(&toml)?;
    let cache = Arc::new(ValidationCache::new(10, Duration::from_secs(60)));

    let pipeline = tilerace_core::TurnPipeline::from_config(&config, cache.clone())?;
    assert_eq!(pipeline.providers().len(), 1);
    assert_eq!(pipeline.providers()[0].name(), "local");
    assert_eq!(pipeline.turn_timeout(), Duration::from_secs(15));
    assert_eq!(pipeline.tiles().language(), "en");
    assert!(Arc::ptr_eq(pipeline.cache(), &cache));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_from_config_rejects_unknown_variant() {
    let config = load_config_from_str("[pipeline]\nvariant = \"klingon\"\n").unwrap();
    let cache = Arc::new(ValidationCache::new(10, Duration::from_secs(60)));
    let result = tilerace_core::TurnPipeline::from_config(&config, cache);
    assert!(matches!(result, Err(PipelineError::Config(_))));
}
