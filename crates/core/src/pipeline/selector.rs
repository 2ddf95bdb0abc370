//! Winner selection across settled provider results.

use super::types::{ProviderResult, ProviderStatus};

/// Highest-scoring evaluated result. Equal scores go to the lowest
/// registration index, so arrival order never matters.
pub fn select_winner(results: &[ProviderResult]) -> Option<&ProviderResult> {
    results
        .iter()
        .filter_map(|r| r.total().map(|total| (total, r)))
        .fold(None, |best: Option<(u32, &ProviderResult)>, (total, r)| match best {
            Some((best_total, best_r))
                if best_total > total || (best_total == total && best_r.index < r.index) =>
            {
                Some((best_total, best_r))
            }
            _ => Some((total, r)),
        })
        .map(|(_, r)| r)
}

/// Explanation for a turn without a winner.
pub fn no_move_reason(results: &[ProviderResult]) -> String {
    if results.is_empty() {
        return "no providers".to_string();
    }
    let summary = results
        .iter()
        .map(|r| {
            let detail = match r.status {
                ProviderStatus::ParsedOk => r.warnings.first().cloned(),
                _ => r.error.clone(),
            };
            match detail {
                Some(d) => format!("{}: {} ({})", r.provider, r.status, d),
                None => format!("{}: {}", r.provider, r.status),
            }
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("no valid candidate: {}", summary)
}
