//! Compliance Hub API Server
//!
//! REST boundary for the compliance decision pipeline.

pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod state;

pub use error::ApiError;
pub use orchestrator::{AnalysisOutcome, Orchestrator};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/domains", get(handlers::list_domains))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
