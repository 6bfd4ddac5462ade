//! Per-domain configuration: prompts, trigger rules, semantic overrides
//!
//! Profiles are loaded once at startup and shared read-only across all
//! queries. Rule evaluation is a pure function of the lowercased query text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CoreError, Domain, RiskLevel};

/// Where the assembler sources context for a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Internal similarity search plus trigger-rule injection
    Retrieval,
    /// External search collaborator (lawsuits, precedents)
    ExternalSearch,
    /// No retrieval; a fixed provenance string stands in for context
    KnowledgeOnly,
}

/// Deterministic mapping from query keywords to injected context units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRule {
    /// Rule label, for logs
    pub name: String,
    /// Any keyword occurring in the lowercased query fires the rule
    pub keywords: Vec<String>,
    /// Unit ids forced into the context set when the rule fires
    pub inject: Vec<String>,
}

impl TriggerRule {
    /// Pure test over the lowercased query text
    pub fn matches(&self, query_lower: &str) -> bool {
        self.keywords.iter().any(|k| query_lower.contains(k.as_str()))
    }
}

/// Deterministic post-inference correction for a known topic.
///
/// Table order is part of the contract: more specific rules precede
/// general ones, and only the first match is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Substring matched against the lowercased query
    pub keyword: String,
    /// Canonical citation that replaces the model's legal basis
    pub citation: String,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

/// Immutable per-domain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainProfile {
    pub domain: Domain,
    pub system_prompt: String,
    pub context_source: ContextSource,
    /// Evaluated in order; all firing rules inject
    pub trigger_rules: Vec<TriggerRule>,
    /// Scanned in order; first match wins
    pub overrides: Vec<OverrideRule>,
    /// Fixed provenance string for knowledge-only domains
    pub provenance: Option<String>,
}

/// Read-only table of all configured domain profiles
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<Domain, DomainProfile>,
}

impl ProfileRegistry {
    pub fn new(profiles: Vec<DomainProfile>) -> Result<Self, CoreError> {
        let mut map = HashMap::new();
        for profile in profiles {
            for rule in &profile.overrides {
                if !(0.0..=1.0).contains(&rule.confidence) {
                    return Err(CoreError::InvalidProfile(format!(
                        "override '{}' in {} has confidence {} outside [0,1]",
                        rule.keyword, profile.domain, rule.confidence
                    )));
                }
            }
            if profile.context_source == ContextSource::KnowledgeOnly
                && profile.provenance.is_none()
            {
                return Err(CoreError::InvalidProfile(format!(
                    "knowledge-only domain {} has no provenance string",
                    profile.domain
                )));
            }
            if map.insert(profile.domain, profile).is_some() {
                return Err(CoreError::InvalidProfile(
                    "duplicate domain profile".to_string(),
                ));
            }
        }
        Ok(Self { profiles: map })
    }

    pub fn get(&self, domain: Domain) -> Option<&DomainProfile> {
        self.profiles.get(&domain)
    }

    /// Configured domains, sorted by display name for stable output
    pub fn domains(&self) -> Vec<Domain> {
        let mut domains: Vec<_> = self.profiles.keys().copied().collect();
        domains.sort_by_key(|d| d.to_string());
        domains
    }
}
