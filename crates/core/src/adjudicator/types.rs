//! Adjudication outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of adjudicating one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    Invalid,
    /// No tier could confirm the word; only an external arbiter can decide.
    NeedsArbitration,
}

impl Verdict {
    pub fn from_found(found: bool) -> Self {
        if found {
            Verdict::Valid
        } else {
            Verdict::Invalid
        }
    }

    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }
}

/// Stage of the word oracle that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Pattern,
    Cache,
    LocalDictionary,
    RemoteDictionary,
    Arbiter,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Pattern => "pattern",
            Tier::Cache => "cache",
            Tier::LocalDictionary => "local_dictionary",
            Tier::RemoteDictionary => "remote_dictionary",
            Tier::Arbiter => "arbiter",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one word plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordJudgement {
    /// Normalized word.
    pub word: String,
    pub verdict: Verdict,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl WordJudgement {
    pub fn new(word: impl Into<String>, verdict: Verdict, tier: Tier) -> Self {
        Self {
            word: word.into(),
            verdict,
            tier,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// True iff every word is valid. Words needing arbitration count as invalid.
pub fn all_valid(judgements: &[WordJudgement]) -> bool {
    judgements.iter().all(|j| j.verdict.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid_treats_arbitration_as_invalid() {
        let ok = WordJudgement::new("CAT", Verdict::Valid, Tier::LocalDictionary);
        let open = WordJudgement::new("QXZ", Verdict::NeedsArbitration, Tier::Arbiter);
        assert!(all_valid(&[ok.clone()]));
        assert!(!all_valid(&[ok, open]));
        assert!(all_valid(&[]));
    }

    #[test]
    fn test_tier_serializes_snake_case() {
        let json = serde_json::to_string(&Tier::LocalDictionary).unwrap();
        assert_eq!(json, "\"local_dictionary\"");
        assert_eq!(Tier::RemoteDictionary.to_string(), "remote_dictionary");
    }
}
