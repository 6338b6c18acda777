//! Concurrent fan-out of one search round.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use super::SearchBackend;
use crate::core::{Document, dedup_by_url};
use crate::error::AgentError;

/// A query that failed during a round.
#[derive(Debug)]
pub struct QueryFailure {
    /// The query text.
    pub query: String,
    /// Why it failed.
    pub error: AgentError,
}

/// Result of one search round.
#[derive(Debug, Default)]
pub struct RetrievalBatch {
    /// URL-unique documents in order of first appearance.
    pub documents: Vec<Document>,
    /// Number of queries dispatched.
    pub queries_issued: usize,
    /// Queries that failed. They contributed no documents.
    pub failures: Vec<QueryFailure>,
}

impl RetrievalBatch {
    /// Returns `true` when queries were issued and every one of them failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.queries_issued > 0 && self.failures.len() == self.queries_issued
    }

    /// Consumes the batch, returning the documents or, if every query
    /// failed, the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first query's error when no query succeeded.
    pub fn into_result(self) -> Result<Vec<Document>, AgentError> {
        if self.all_failed() {
            let first = self.failures.into_iter().next();
            return Err(first.map_or_else(
                || AgentError::Orchestration {
                    message: "search round failed without an error".to_string(),
                },
                |f| f.error,
            ));
        }
        Ok(self.documents)
    }
}

/// Fans queries out to a [`SearchBackend`] and joins the results.
///
/// Every query of a round is dispatched at once (bounded by the concurrency
/// cap) and the round completes only after all of them finish. A failing
/// query is isolated: it contributes no documents and is reported in
/// [`RetrievalBatch::failures`].
pub struct RetrievalCoordinator {
    backend: Arc<dyn SearchBackend>,
    max_concurrency: usize,
}

impl RetrievalCoordinator {
    /// Creates a coordinator that runs at most `max_concurrency` searches at once.
    pub fn new(backend: Arc<dyn SearchBackend>, max_concurrency: usize) -> Self {
        Self {
            backend,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Runs one search round.
    ///
    /// An empty `queries` slice issues no calls and returns an empty batch.
    pub async fn retrieve(&self, queries: &[String]) -> RetrievalBatch {
        if queries.is_empty() {
            return RetrievalBatch::default();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let calls = queries.iter().map(|query| {
            let sem = Arc::clone(&semaphore);
            let backend = Arc::clone(&self.backend);
            async move {
                let _permit = sem.acquire().await.map_err(|e| AgentError::Orchestration {
                    message: format!("Semaphore acquire failed: {e}"),
                })?;
                backend.search(query).await
            }
        });

        let results = join_all(calls).await;

        let mut flat = Vec::new();
        let mut failures = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(docs) => flat.extend(docs),
                Err(error) => {
                    tracing::warn!(
                        backend = self.backend.name(),
                        query = query.as_str(),
                        error = %error,
                        "search query failed"
                    );
                    failures.push(QueryFailure {
                        query: query.clone(),
                        error,
                    });
                }
            }
        }

        let documents = dedup_by_url(flat);
        tracing::debug!(
            queries = queries.len(),
            failed = failures.len(),
            documents = documents.len(),
            "search round complete"
        );

        RetrievalBatch {
            documents,
            queries_issued: queries.len(),
            failures,
        }
    }
}

impl std::fmt::Debug for RetrievalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalCoordinator")
            .field("backend", &self.backend.name())
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}
