//! Collaborator traits the context assembler depends on

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::RetrievalError;

/// One similarity-search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredUnit {
    /// Context unit id, unique within its domain
    pub id: String,
    /// Matched text (clause granularity)
    pub text: String,
    pub score: f32,
}

/// Similarity search plus id-to-full-text expansion.
///
/// An empty search result is a valid, non-error outcome.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Top-k units for a query, best first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredUnit>, RetrievalError>;

    /// Full text of a unit, or None if the id is unknown
    async fn expand(&self, unit_id: &str) -> Result<Option<String>, RetrievalError>;
}

/// External search collaborator (lawsuits, precedents).
///
/// Failure is non-fatal for callers; the assembler substitutes a fixed
/// marker instead of propagating it.
#[async_trait]
pub trait ExternalSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, RetrievalError>;
}
