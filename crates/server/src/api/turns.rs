//! Turn evaluation API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tilerace_core::{MoveProvider, PipelineError, StateSnapshot, TurnReport};
use tracing::warn;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateParams {
    /// Comma-separated provider names to race instead of all of them.
    #[serde(default)]
    pub providers: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn pipeline_error(e: PipelineError) -> ApiError {
    let status = match e {
        PipelineError::Snapshot(_) => StatusCode::BAD_REQUEST,
        PipelineError::NoProviders => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/turns/evaluate
///
/// Race the providers against the posted snapshot and return the full turn
/// report. A turn without a valid candidate is still a 200 with a `no_move`
/// outcome.
pub async fn evaluate_turn(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EvaluateParams>,
    Json(snapshot): Json<StateSnapshot>,
) -> Result<Json<TurnReport>, ApiError> {
    let pipeline = state.pipeline();

    let providers = match params.providers.as_deref() {
        Some(list) => select_providers(pipeline.providers(), list)?,
        None => pipeline.providers().to_vec(),
    };

    let report = pipeline
        .evaluate_turn_with(&snapshot, &providers, None)
        .await
        .map_err(|e| {
            warn!(error = %e, "Turn evaluation rejected");
            pipeline_error(e)
        })?;

    Ok(Json(report))
}

/// Pick the named providers, keeping registration order.
fn select_providers(
    registered: &[Arc<dyn MoveProvider>],
    list: &str,
) -> Result<Vec<Arc<dyn MoveProvider>>, ApiError> {
    let wanted: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(unknown) = wanted
        .iter()
        .find(|name| !registered.iter().any(|p| p.name() == **name))
    {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("Unknown provider: {}", unknown),
        ));
    }

    Ok(registered
        .iter()
        .filter(|p| wanted.contains(&p.name()))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerace_core::testing::MockProvider;

    fn registered() -> Vec<Arc<dyn MoveProvider>> {
        ["alpha", "beta", "gamma"]
            .into_iter()
            .map(|name| Arc::new(MockProvider::new(name)) as Arc<dyn MoveProvider>)
            .collect()
    }

    #[test]
    fn test_select_providers_keeps_registration_order() {
        let selected = select_providers(&registered(), "gamma, alpha").unwrap();
        let names: Vec<&str> = selected.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_select_providers_rejects_unknown() {
        match select_providers(&registered(), "alpha,delta") {
            Err((status, Json(body))) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.error.contains("delta"));
            }
            Ok(_) => panic!("unknown provider accepted"),
        }
    }

    #[test]
    fn test_select_providers_empty_list() {
        assert!(select_providers(&registered(), " , ").unwrap().is_empty());
    }
}
