//! Structured legal corpus produced by the (external) ingestion pipeline
//!
//! The ingestion side turns raw regulation text into articles and clauses;
//! this module only reads its JSON output.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::RetrievalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    pub clause_id: String,
    pub text: String,
}

impl Article {
    /// Full article text used for context expansion
    pub fn full_text(&self) -> String {
        let mut out = format!("Article {} - {}:", self.article_id, self.title);
        for clause in &self.clauses {
            out.push('\n');
            out.push_str(&clause.text);
        }
        out
    }
}

/// Load a structured corpus document from disk
pub fn load_corpus(path: &Path) -> Result<CorpusDocument, RetrievalError> {
    let raw = std::fs::read_to_string(path)?;
    let doc = serde_json::from_str(&raw)?;
    Ok(doc)
}
