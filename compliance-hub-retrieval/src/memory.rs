//! In-memory index for development and testing
//!
//! Keyword-overlap scoring stands in for the real similarity engine,
//! which is an external collaborator and out of scope here. Built once
//! at startup and read-only afterwards.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::corpus::CorpusDocument;
use crate::{RetrievalBackend, RetrievalError, ScoredUnit};

struct Entry {
    unit_id: String,
    text: String,
    text_lower: String,
}

/// Clause-granularity search over full-text expandable units
pub struct InMemoryIndex {
    entries: Vec<Entry>,
    units: BTreeMap<String, String>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            units: BTreeMap::new(),
        }
    }

    /// Register a unit with its full expansion text and searchable fragments
    pub fn insert_unit(&mut self, id: &str, full_text: &str, fragments: &[&str]) {
        self.units.insert(id.to_string(), full_text.to_string());
        for fragment in fragments {
            self.entries.push(Entry {
                unit_id: id.to_string(),
                text: fragment.to_string(),
                text_lower: fragment.to_lowercase(),
            });
        }
    }

    /// Build an index from a structured corpus document
    pub fn from_corpus(doc: &CorpusDocument) -> Self {
        let mut index = Self::new();
        for article in &doc.articles {
            let fragments: Vec<String> = article
                .clauses
                .iter()
                .map(|c| format!("Article {} - {}: {}", article.article_id, article.title, c.text))
                .collect();
            let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
            index.insert_unit(&article.article_id, &article.full_text(), &refs);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Query terms worth scoring; short tokens are mostly stopwords
fn terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl RetrievalBackend for InMemoryIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredUnit>, RetrievalError> {
        let terms = terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // Best-scoring fragment per unit, so top-k covers k distinct units
        let mut best: BTreeMap<&str, ScoredUnit> = BTreeMap::new();
        for entry in &self.entries {
            let matched = terms.iter().filter(|t| entry.text_lower.contains(t.as_str())).count();
            if matched == 0 {
                continue;
            }
            let score = matched as f32 / terms.len() as f32;
            let improves = best
                .get(entry.unit_id.as_str())
                .map_or(true, |existing| score > existing.score);
            if improves {
                best.insert(
                    entry.unit_id.as_str(),
                    ScoredUnit {
                        id: entry.unit_id.clone(),
                        text: entry.text.clone(),
                        score,
                    },
                );
            }
        }
        let mut hits: Vec<ScoredUnit> = best.into_values().collect();

        // Deterministic order: score descending, then id ascending
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn expand(&self, unit_id: &str) -> Result<Option<String>, RetrievalError> {
        Ok(self.units.get(unit_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InMemoryIndex {
        let mut index = InMemoryIndex::new();
        index.insert_unit(
            "83",
            "Article 83 - Administrative fines:\nFines up to 20M EUR or 4% of turnover.",
            &["administrative fines penalty sanction euro turnover"],
        );
        index.insert_unit(
            "4",
            "Article 4 - Definitions:\nPersonal data means any information relating to a person.",
            &["definitions personal data identifiable natural person"],
        );
        index.insert_unit(
            "37",
            "Article 37 - Designation of the data protection officer:\nA DPO shall be designated.",
            &["data protection officer designation public authority"],
        );
        index
    }

    #[tokio::test]
    async fn test_search_ranks_by_overlap() {
        let index = sample_index();
        let hits = index.search("personal data definitions", 3).await.unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].id, "4");
        assert!(hits[0].score > 0.5);
    }

    #[tokio::test]
    async fn test_search_empty_result_is_ok() {
        let index = sample_index();
        let hits = index.search("maritime salvage law", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_k() {
        let index = sample_index();
        let hits = index.search("data", 1).await.unwrap();
        assert!(hits.len() <= 1);
    }

    #[tokio::test]
    async fn test_multi_fragment_unit_yields_one_hit() {
        let mut index = InMemoryIndex::new();
        index.insert_unit(
            "83",
            "Article 83 - Administrative fines:\nFull text.",
            &[
                "administrative fines general conditions",
                "administrative fines tiered amounts",
                "administrative fines supervisory authority",
            ],
        );
        index.insert_unit(
            "84",
            "Article 84 - Penalties:\nFull text.",
            &["other penalties administrative measures"],
        );

        let hits = index.search("administrative fines", 2).await.unwrap();
        // Three matching fragments of unit 83 collapse to its best one,
        // leaving room for unit 84 within k
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "83");
        assert_eq!(hits[1].id, "84");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_expand_known_and_unknown() {
        let index = sample_index();
        let text = index.expand("83").await.unwrap().unwrap();
        assert!(text.starts_with("Article 83"));
        assert!(index.expand("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_corpus_builds_expandable_units() {
        let doc: CorpusDocument = serde_json::from_str(
            r#"{
                "articles": [
                    {
                        "article_id": "5",
                        "title": "Principles relating to processing",
                        "clauses": [{"clause_id": "1", "text": "Processed lawfully, fairly and transparently."}]
                    }
                ]
            }"#,
        )
        .unwrap();

        let index = InMemoryIndex::from_corpus(&doc);
        assert_eq!(index.len(), 1);
        let hits = index.search("lawfully processed", 3).await.unwrap();
        assert_eq!(hits[0].id, "5");
        assert!(index.expand("5").await.unwrap().unwrap().contains("transparently"));
    }
}
