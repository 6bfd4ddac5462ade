//! External search collaborator clients

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::{ExternalSearch, RetrievalError};

const DEFAULT_CACHE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

/// HTTP client for a Tavily-style search endpoint, with an LRU cache of
/// successful responses keyed by query text
pub struct HttpExternalSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    cache: Mutex<LruCache<String, String>>,
}

impl HttpExternalSearch {
    pub fn new(endpoint: String, api_key: String) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let cache_size = NonZeroUsize::new(DEFAULT_CACHE_SIZE)
            .unwrap_or(NonZeroUsize::new(1).unwrap());
        Ok(Self {
            client,
            endpoint,
            api_key,
            cache: Mutex::new(LruCache::new(cache_size)),
        })
    }

    fn render(&self, response: SearchResponse) -> String {
        let mut out = String::new();
        if let Some(answer) = response.answer {
            out.push_str("Search Digest: ");
            out.push_str(&answer);
        }
        for result in response.results.into_iter().take(MAX_RESULTS) {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&format!("[{}] {} ({})", result.title, result.content, result.url));
        }
        out
    }
}

#[async_trait]
impl ExternalSearch for HttpExternalSearch {
    async fn search(&self, query: &str) -> Result<String, RetrievalError> {
        if let Some(cached) = self.cache.lock().get(query).cloned() {
            tracing::debug!("External search cache hit for query");
            return Ok(cached);
        }

        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "search_depth": "advanced",
            "include_answer": true,
            "max_results": MAX_RESULTS,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::External(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RetrievalError::External(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::External(e.to_string()))?;
        let text = self.render(parsed);

        if text.is_empty() {
            return Err(RetrievalError::External(
                "search returned no usable content".to_string(),
            ));
        }

        self.cache.lock().put(query.to_string(), text.clone());
        Ok(text)
    }
}

/// Stand-in for deployments without an external search endpoint.
/// Always fails, which callers substitute with their fixed marker.
pub struct DisabledExternalSearch;

#[async_trait]
impl ExternalSearch for DisabledExternalSearch {
    async fn search(&self, _query: &str) -> Result<String, RetrievalError> {
        Err(RetrievalError::External(
            "no external search endpoint configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_search_always_fails() {
        let search = DisabledExternalSearch;
        let err = search.search("recent FDA lawsuits").await.unwrap_err();
        assert!(matches!(err, RetrievalError::External(_)));
    }

    #[test]
    fn test_render_combines_answer_and_results() {
        let search = HttpExternalSearch::new("http://localhost:1".to_string(), "k".to_string())
            .unwrap();
        let response = SearchResponse {
            answer: Some("Two recalls this quarter.".to_string()),
            results: vec![SearchResult {
                title: "FDA v. Acme".to_string(),
                content: "Labeling violation ruling.".to_string(),
                url: "https://example.com/case".to_string(),
            }],
        };
        let text = search.render(response);
        assert!(text.starts_with("Search Digest: Two recalls"));
        assert!(text.contains("FDA v. Acme"));
    }
}
