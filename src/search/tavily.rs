//! Tavily web search client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SearchBackend;
use crate::core::Document;
use crate::error::AgentError;

/// Maximum bytes of an error response body kept in the error message.
const MAX_ERROR_BODY: usize = 500;

/// Search backend backed by the Tavily search API.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl SearchHit {
    fn into_document(self) -> Option<Document> {
        if self.url.trim().is_empty() {
            return None;
        }
        let content = self.content.or(self.snippet).unwrap_or_default();
        Some(Document {
            url: self.url,
            title: self.title,
            content,
        })
    }
}

impl TavilySearch {
    /// Creates a client for `endpoint` with a per-request `timeout`.
    #[must_use]
    pub fn new(api_key: &str, endpoint: &str, max_results: usize, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "HTTP client setup failed, using defaults without timeout");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            max_results,
        }
    }

    fn transport_error(e: &reqwest::Error) -> AgentError {
        if e.is_timeout() {
            AgentError::Timeout {
                message: e.to_string(),
            }
        } else {
            AgentError::Search {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            }
        }
    }
}

impl std::fmt::Debug for TavilySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilySearch")
            .field("endpoint", &self.endpoint)
            .field("max_results", &self.max_results)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError> {
        if self.api_key.trim().is_empty() {
            tracing::warn!(query, "search API key is empty; returning no documents");
            return Ok(Vec::new());
        }

        let body = SearchRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| text.is_char_boundary(i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(AgentError::Search {
                message: format!("HTTP {status}: {text}"),
                status: Some(status.as_u16()),
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let documents: Vec<Document> = parsed
            .results
            .into_iter()
            .filter_map(SearchHit::into_document)
            .collect();

        tracing::debug!(query, results = documents.len(), "tavily search complete");
        Ok(documents)
    }
}
