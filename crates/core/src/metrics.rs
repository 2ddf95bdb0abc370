//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Turn pipeline (turn outcomes, per-provider results)
//! - Word adjudication (tier decisions, remote lookups, cache evictions)
//! - LLM token usage

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Turn Pipeline Metrics
// =============================================================================

/// Terminal provider results by provider and status.
pub static PROVIDER_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tilerace_provider_results_total",
            "Terminal provider results per turn",
        ),
        &["provider", "status"], // status: "evaluated", "rule_invalid", "timed_out", ...
    )
    .unwrap()
});

/// Turn evaluation duration in seconds.
pub static TURN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "tilerace_turn_duration_seconds",
            "Duration of a full turn evaluation",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
    )
    .unwrap()
});

/// Turns evaluated by outcome.
pub static TURN_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tilerace_turn_outcomes_total", "Turns evaluated"),
        &["outcome"], // "committed", "no_move"
    )
    .unwrap()
});

// =============================================================================
// Adjudication Metrics
// =============================================================================

/// Word adjudications by deciding tier and verdict.
pub static ADJUDICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tilerace_adjudications_total", "Words adjudicated"),
        &["tier", "verdict"],
    )
    .unwrap()
});

/// Remote dictionary attempts by backend and result.
pub static REMOTE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tilerace_remote_lookups_total",
            "Remote dictionary lookup attempts",
        ),
        &["backend", "result"], // "found", "not_found", "error"
    )
    .unwrap()
});

/// Cache entries removed by capacity eviction.
pub static CACHE_EVICTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tilerace_cache_evictions_total",
        "Validation cache entries evicted for capacity",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tilerace_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(PROVIDER_RESULTS.clone()),
        Box::new(TURN_DURATION.clone()),
        Box::new(TURN_OUTCOMES.clone()),
        // Adjudication
        Box::new(ADJUDICATIONS.clone()),
        Box::new(REMOTE_LOOKUPS.clone()),
        Box::new(CACHE_EVICTIONS.clone()),
        // External services
        Box::new(LLM_TOKENS.clone()),
    ]
}
