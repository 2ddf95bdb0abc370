//! Per-candidate evaluation: parse → rules → words → adjudication → score.

use tracing::{debug, warn};

use super::types::{ProviderResult, ProviderStatus};
use crate::adjudicator::{all_valid, resolve_with_arbiter, TieredAdjudicator, Verdict, WordArbiter};
use crate::board::{Board, Rack, TileSet};
use crate::provider::{parse_candidate, MoveAction};
use crate::rules::{check_placements, RuleViolation};
use crate::scoring::{score_move, ScoringRules};
use crate::text::normalize_word;
use crate::words::extract_words;

/// Read-only view of the turn shared by every candidate evaluation.
pub struct CandidateEvaluator<'a> {
    pub board: &'a Board,
    pub rack: &'a Rack,
    pub tiles: &'a TileSet,
    pub rules: &'a ScoringRules,
    pub adjudicator: &'a TieredAdjudicator,
    pub arbiter: Option<&'a dyn WordArbiter>,
}

impl CandidateEvaluator<'_> {
    /// Evaluate the provider's raw `text`, filling in `result`.
    ///
    /// Stops at the first failing stage. The board is never modified.
    pub async fn evaluate(&self, mut result: ProviderResult, text: &str) -> ProviderResult {
        // Parse
        let parsed = match parse_candidate(text, self.board.size(), self.rack) {
            Ok(parsed) => parsed,
            Err(e) => return result.fail(ProviderStatus::ParseError, e.to_string()),
        };
        result.parse_method = Some(parsed.method);
        let candidate = parsed.candidate;
        result.candidate = Some(candidate.clone());

        if candidate.action != MoveAction::Play {
            result.status = ProviderStatus::ParsedOk;
            result.warnings.push(match candidate.action {
                MoveAction::Pass => "provider passed".to_string(),
                _ => "provider asked for an exchange".to_string(),
            });
            return result;
        }

        // Rules
        let placements = &candidate.placements;
        let axis = match check_placements(self.board, self.rack, placements) {
            Ok(axis) => axis,
            Err(v) => return result.fail(ProviderStatus::RuleInvalid, v.to_string()),
        };

        // Words
        let words = extract_words(self.board, placements, axis);
        if words.is_empty() {
            return result.fail(
                ProviderStatus::RuleInvalid,
                RuleViolation::NoWordFormed.to_string(),
            );
        }
        if let Some(declared) = &candidate.declared_word {
            let main = words.iter().find(|w| w.axis == axis).unwrap_or(&words[0]);
            if normalize_word(declared) != main.text {
                warn!(
                    provider = %result.provider,
                    declared = %declared,
                    extracted = %main.text,
                    "Declared word differs from the main word"
                );
                result.warnings.push(format!(
                    "declared word {} differs from main word {}",
                    declared, main.text
                ));
            }
        }

        // Adjudication
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        let mut judgements = self.adjudicator.adjudicate_all(&texts).await;
        if let Some(arbiter) = self.arbiter {
            if let Err(e) =
                resolve_with_arbiter(&mut judgements, arbiter, self.adjudicator.language()).await
            {
                warn!(provider = %result.provider, error = %e, "Arbiter failed");
                result.warnings.push(format!("arbiter failed: {}", e));
            }
        }
        let valid = all_valid(&judgements);
        let rejected: Vec<String> = judgements
            .iter()
            .filter(|j| j.verdict != Verdict::Valid)
            .map(|j| j.word.clone())
            .collect();
        result.words = judgements;
        if !valid {
            return result.fail(
                ProviderStatus::JudgeInvalid,
                format!("invalid words: {}", rejected.join(", ")),
            );
        }

        // Score
        let score = score_move(self.board, placements, &words, self.rack, self.tiles, self.rules);
        debug!(
            provider = %result.provider,
            words = ?texts,
            score = score.total,
            "Candidate evaluated"
        );
        result.score = Some(score);
        result.status = ProviderStatus::Evaluated;
        result
    }
}
