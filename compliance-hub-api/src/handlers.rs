//! API request handlers

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use compliance_hub_core::AnalyzeRequest;

use crate::orchestrator::AnalysisOutcome;
use crate::{ApiError, AppState};

/// Run a query through the compliance pipeline
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let outcome = state.orchestrator.analyze(&req).await?;

    // Exhaustion is a retryable service condition, not a disposition
    if let AnalysisOutcome::Degraded(message) = outcome {
        return Err(ApiError::Degraded(message));
    }

    Ok(Json(outcome.into_response()))
}

/// List the domains with a configured profile
pub async fn list_domains(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.profiles.domains())
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "compliance-hub"
    }))
}
