//! Deterministic context assembly
//!
//! Given a fixed backend snapshot, identical query + profile input yields
//! identical output: the unit set is kept in a BTreeMap so expansion and
//! concatenation always run in ascending id order.

use std::collections::BTreeMap;

use compliance_hub_core::{
    ComplianceQuery, ContextSource, DomainProfile, RetrievedUnit, UnitOrigin,
};
use compliance_hub_retrieval::{ExternalSearch, RetrievalBackend};

use crate::ContextError;

/// Marker substituted when the external collaborator fails; never fatal
pub const NO_EXTERNAL_CAPABILITY: &str =
    "No external search capability. Relying on general model knowledge.";

/// Wider retrieval for multi-concept queries, narrower otherwise
const WIDE_K: usize = 6;
const NARROW_K: usize = 3;

/// Cues that a query spans several distinct legal topics
const MULTI_CONCEPT_CUES: &[&str] = &[
    " and ",
    " as well as ",
    " along with ",
    " combined with ",
    " versus ",
    " vs ",
    " compared to ",
    " both ",
];

/// Pure width classifier over the query text
pub fn needs_wide_retrieval(query: &str) -> bool {
    let lower = query.to_lowercase();
    MULTI_CONCEPT_CUES.iter().any(|cue| lower.contains(cue))
}

/// Context produced for one query
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Concatenated context text handed to inference
    pub text: String,
    /// Units backing the text, ascending id order, deduplicated
    pub units: Vec<RetrievedUnit>,
}

/// Builds the textual context for a query according to its domain profile
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    pub async fn assemble(
        &self,
        query: &ComplianceQuery,
        profile: &DomainProfile,
        retrieval: &dyn RetrievalBackend,
        external: &dyn ExternalSearch,
    ) -> Result<AssembledContext, ContextError> {
        match profile.context_source {
            ContextSource::KnowledgeOnly => Ok(self.knowledge_only(profile)),
            ContextSource::ExternalSearch => Ok(self.external(query, external).await),
            ContextSource::Retrieval => self.retrieval(query, profile, retrieval).await,
        }
    }

    fn knowledge_only(&self, profile: &DomainProfile) -> AssembledContext {
        // Validated at registry construction; default keeps this total
        let text = profile
            .provenance
            .clone()
            .unwrap_or_else(|| "Source: Modeled Knowledge.".to_string());
        AssembledContext {
            text,
            units: Vec::new(),
        }
    }

    async fn external(
        &self,
        query: &ComplianceQuery,
        external: &dyn ExternalSearch,
    ) -> AssembledContext {
        match external.search(&query.text).await {
            Ok(text) => AssembledContext {
                units: vec![RetrievedUnit {
                    id: "external-search".to_string(),
                    text: text.clone(),
                    origin: UnitOrigin::External,
                }],
                text,
            },
            Err(e) => {
                tracing::warn!(query_id = %query.id, "External search unavailable: {}", e);
                AssembledContext {
                    text: NO_EXTERNAL_CAPABILITY.to_string(),
                    units: Vec::new(),
                }
            }
        }
    }

    async fn retrieval(
        &self,
        query: &ComplianceQuery,
        profile: &DomainProfile,
        retrieval: &dyn RetrievalBackend,
    ) -> Result<AssembledContext, ContextError> {
        let k = if needs_wide_retrieval(&query.text) {
            WIDE_K
        } else {
            NARROW_K
        };
        let hits = retrieval.search(&query.text, k).await?;
        let search_empty = hits.is_empty();

        // BTreeMap keeps ids ascending and insertion idempotent
        let mut origins: BTreeMap<String, UnitOrigin> = BTreeMap::new();
        for hit in hits {
            origins.entry(hit.id).or_insert(UnitOrigin::Searched);
        }

        let lowered = query.lowered();
        let mut rule_fired = false;
        for rule in &profile.trigger_rules {
            if rule.matches(&lowered) {
                rule_fired = true;
                tracing::debug!(query_id = %query.id, rule = %rule.name, "Trigger rule fired");
                for unit_id in &rule.inject {
                    origins
                        .entry(unit_id.clone())
                        .or_insert(UnitOrigin::RuleInjected);
                }
            }
        }

        if search_empty && !rule_fired {
            return Err(ContextError::InsufficientContext);
        }

        let mut units = Vec::with_capacity(origins.len());
        for (id, origin) in origins {
            match retrieval.expand(&id).await? {
                Some(text) => units.push(RetrievedUnit { id, text, origin }),
                None => {
                    tracing::warn!(query_id = %query.id, unit_id = %id, "Unit id not expandable")
                }
            }
        }

        if units.is_empty() {
            return Err(ContextError::InsufficientContext);
        }

        let text = units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(AssembledContext { text, units })
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}
