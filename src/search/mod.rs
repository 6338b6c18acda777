//! Web search collaborators and the retrieval coordinator.
//!
//! A [`SearchBackend`] answers one query at a time. The
//! [`RetrievalCoordinator`] fans a round of queries out to a backend
//! concurrently and flattens the results into a URL-unique document list.

pub mod coordinator;
pub mod tavily;

use std::sync::Arc;

use async_trait::async_trait;

pub use coordinator::{QueryFailure, RetrievalBatch, RetrievalCoordinator};
pub use tavily::TavilySearch;

use crate::agent::config::AgentConfig;
use crate::core::Document;
use crate::error::AgentError;

/// Trait for web search backends.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logging (e.g., `"tavily"`).
    fn name(&self) -> &'static str;

    /// Runs a single query.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Search`] on HTTP failures (with the status when
    /// the service responded) or [`AgentError::Timeout`] when the request
    /// timed out.
    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError>;
}

/// Search backend that never finds anything.
///
/// Used when no search API key is configured so the loop still runs and
/// ends with the "no information found" answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSearch;

#[async_trait]
impl SearchBackend for OfflineSearch {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError> {
        tracing::debug!(query, "offline search returns no documents");
        Ok(Vec::new())
    }
}

/// Creates the search backend for the given configuration.
///
/// Falls back to [`OfflineSearch`] when no search API key is configured.
pub fn create_search_backend(config: &AgentConfig) -> Arc<dyn SearchBackend> {
    match config.search_api_key.as_deref() {
        Some(key) => Arc::new(TavilySearch::new(
            key,
            &config.search_url,
            config.search_max_results,
            config.timeout,
        )),
        None => {
            tracing::warn!("TAVILY_API_KEY is not set; searches will return no documents");
            Arc::new(OfflineSearch)
        }
    }
}
