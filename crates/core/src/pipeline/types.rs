//! Turn pipeline result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::adjudicator::WordJudgement;
use crate::board::Placement;
use crate::provider::{LlmUsage, MoveCandidate, ParseMethod};
use crate::scoring::MoveScore;

/// Lifecycle of one provider's proposal within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Launched, no answer yet. Only seen by progress listeners.
    Pending,
    /// Parsed, but the proposal is a pass or an exchange.
    ParsedOk,
    ParseError,
    RuleInvalid,
    JudgeInvalid,
    TimedOut,
    ProviderError,
    /// Legal, every word valid, scored. Eligible for selection.
    Evaluated,
}

impl ProviderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderStatus::Pending => "pending",
            ProviderStatus::ParsedOk => "parsed_ok",
            ProviderStatus::ParseError => "parse_error",
            ProviderStatus::RuleInvalid => "rule_invalid",
            ProviderStatus::JudgeInvalid => "judge_invalid",
            ProviderStatus::TimedOut => "timed_out",
            ProviderStatus::ProviderError => "provider_error",
            ProviderStatus::Evaluated => "evaluated",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != ProviderStatus::Pending
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider's outcome for a turn, with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    /// Registration index; lower wins ties.
    pub index: usize,
    pub status: ProviderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<MoveCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_method: Option<ParseMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordJudgement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<MoveScore>,
    /// Raw provider text, kept for observability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
    /// Time from launch to the provider's answer.
    pub elapsed_ms: u64,
}

impl ProviderResult {
    pub fn pending(provider: impl Into<String>, index: usize) -> Self {
        Self {
            provider: provider.into(),
            index,
            status: ProviderStatus::Pending,
            candidate: None,
            parse_method: None,
            words: Vec::new(),
            score: None,
            raw_text: None,
            error: None,
            warnings: Vec::new(),
            usage: None,
            elapsed_ms: 0,
        }
    }

    /// Finish with a failure status and message.
    pub fn fail(mut self, status: ProviderStatus, error: impl Into<String>) -> Self {
        self.status = status;
        self.error = Some(error.into());
        self
    }

    /// Total score if the proposal was evaluated.
    pub fn total(&self) -> Option<u32> {
        match self.status {
            ProviderStatus::Evaluated => self.score.as_ref().map(|s| s.total),
            _ => None,
        }
    }
}

/// The winning move, ready for the caller to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedMove {
    pub provider: String,
    pub placements: Vec<Placement>,
    /// Every word formed, main word first.
    pub words: Vec<String>,
    pub score: MoveScore,
    /// Rack after removing the played tiles, for refilling.
    pub remaining_rack: String,
}

/// What the turn produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Committed(CommittedMove),
    /// No candidate reached evaluated status. The caller decides between
    /// pass, exchange and retry.
    NoMove { reason: String },
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Committed(_) => "committed",
            TurnOutcome::NoMove { .. } => "no_move",
        }
    }

    pub fn committed(&self) -> Option<&CommittedMove> {
        match self {
            TurnOutcome::Committed(m) => Some(m),
            TurnOutcome::NoMove { .. } => None,
        }
    }
}

/// Full record of one turn evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: TurnOutcome,
    /// One terminal result per provider, in registration order.
    pub results: Vec<ProviderResult>,
}

impl TurnReport {
    pub fn result_for(&self, provider: &str) -> Option<&ProviderResult> {
        self.results.iter().find(|r| r.provider == provider)
    }
}
