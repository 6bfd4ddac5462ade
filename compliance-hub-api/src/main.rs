//! Compliance Hub - Main Application Entry Point
//!
//! Regulatory-compliance question answering with deterministic context
//! assembly, a resilient structured-inference cascade, and a governance
//! gate in front of every released answer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use compliance_hub_api::AppState;
use compliance_hub_context::builtin_profiles;
use compliance_hub_core::ProfileRegistry;
use compliance_hub_governance::RiskThresholds;
use compliance_hub_inference::{ChatCompletionsBackend, Credential};
use compliance_hub_retrieval::{
    load_corpus, DisabledExternalSearch, ExternalSearch, HttpExternalSearch, InMemoryIndex,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,compliance_hub=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid u16");

    tracing::info!("Starting Compliance Hub server on {}:{}", host, port);

    // Retrieval index: load the structured corpus if one is configured
    let index = match std::env::var("CORPUS_PATH") {
        Ok(path) => {
            let doc = load_corpus(Path::new(&path))?;
            let index = InMemoryIndex::from_corpus(&doc);
            tracing::info!("Loaded corpus from {} ({} units)", path, index.len());
            index
        }
        Err(_) => {
            tracing::warn!("CORPUS_PATH not set; retrieval index is empty");
            InMemoryIndex::new()
        }
    };

    // External search collaborator (optional)
    let external: Arc<dyn ExternalSearch> = match std::env::var("EXTERNAL_SEARCH_URL") {
        Ok(url) => {
            let api_key = std::env::var("EXTERNAL_SEARCH_API_KEY").unwrap_or_default();
            tracing::info!("External search enabled via {}", url);
            Arc::new(HttpExternalSearch::new(url, api_key)?)
        }
        Err(_) => {
            tracing::info!("External search disabled");
            Arc::new(DisabledExternalSearch)
        }
    };

    // Model backend and credential order
    let base_url = std::env::var("LLM_API_BASE")
        .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
    let credentials: Vec<Credential> = std::env::var("LLM_API_KEYS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .enumerate()
                .map(|(i, secret)| Credential::new(format!("key-{}", i + 1), secret))
                .collect()
        })
        .unwrap_or_default();
    if credentials.is_empty() {
        anyhow::bail!("LLM_API_KEYS must contain at least one credential");
    }

    let tiers: Vec<String> = std::env::var("LLM_MODELS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_else(|_| {
            compliance_hub_api::state::DEFAULT_MODEL_TIERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        });
    tracing::info!("Cascade configured: {} tiers, {} credentials", tiers.len(), credentials.len());

    let call_timeout = std::env::var("LLM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(compliance_hub_api::state::DEFAULT_CALL_TIMEOUT);

    // Governance thresholds
    let defaults = RiskThresholds::default();
    let low = env_f64("GATE_LOW_THRESHOLD").unwrap_or(defaults.low);
    let medium = env_f64("GATE_MEDIUM_THRESHOLD").unwrap_or(defaults.medium);
    let thresholds = RiskThresholds::new(low, medium)?;

    let app_state = Arc::new(AppState::with_components(
        ProfileRegistry::new(builtin_profiles())?,
        Arc::new(index),
        external,
        Arc::new(ChatCompletionsBackend::new(base_url)),
        tiers,
        credentials,
        thresholds,
        call_timeout,
    )?);

    let app = compliance_hub_api::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse::<f64>().ok())
}
