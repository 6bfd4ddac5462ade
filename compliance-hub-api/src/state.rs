//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use compliance_hub_core::ProfileRegistry;
use compliance_hub_governance::{GovernanceGate, RiskThresholds};
use compliance_hub_inference::{Credential, InferenceCascade, ModelBackend};
use compliance_hub_retrieval::{ExternalSearch, RetrievalBackend};

use crate::Orchestrator;

/// Model ladder tried best-quality first when none is configured
pub const DEFAULT_MODEL_TIERS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-70b-versatile",
    "llama3-70b-8192",
    "mixtral-8x7b-32768",
    "llama-3.1-8b-instant",
    "llama3-8b-8192",
    "gemma2-9b-it",
];

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state. Everything here is fixed at startup and
/// read-only for the process lifetime.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub profiles: Arc<ProfileRegistry>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        profiles: ProfileRegistry,
        retrieval: Arc<dyn RetrievalBackend>,
        external: Arc<dyn ExternalSearch>,
        backend: Arc<dyn ModelBackend>,
        tiers: Vec<String>,
        credentials: Vec<Credential>,
        thresholds: RiskThresholds,
        call_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let profiles = Arc::new(profiles);
        let cascade = InferenceCascade::new(backend, tiers, credentials, call_timeout)?;
        let gate = GovernanceGate::new(thresholds);
        let orchestrator = Orchestrator::new(
            profiles.clone(),
            retrieval,
            external,
            cascade,
            gate,
        );
        Ok(Self {
            orchestrator,
            profiles,
        })
    }
}
