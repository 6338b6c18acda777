//! Collaborator seams of the research loop.
//!
//! The loop controller only talks to these traits, so tests can script
//! every external call without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{CitationRef, EvidenceSet};
use crate::error::AgentError;

/// Outcome of a reflection step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// Whether the evidence is judged insufficient.
    pub need_more: bool,
    /// Refined queries to run next. Empty when `need_more` is false.
    pub new_queries: Vec<String>,
}

impl Reflection {
    /// Evidence is enough; stop searching.
    #[must_use]
    pub const fn sufficient() -> Self {
        Self {
            need_more: false,
            new_queries: Vec::new(),
        }
    }

    /// Evidence is insufficient; run `queries` next.
    #[must_use]
    pub fn needs(queries: Vec<String>) -> Self {
        Self {
            need_more: true,
            new_queries: queries,
        }
    }
}

/// Answer text plus the 1-based evidence numbers it relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisDraft {
    /// Answer text without citation markers.
    pub answer: String,
    /// Cited evidence numbers in the order markers should appear.
    pub cited_ids: Vec<CitationRef>,
}

/// Turns a question into initial search queries.
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Produces search queries for `question`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the model call fails or its output
    /// cannot be understood.
    async fn generate(&self, question: &str) -> Result<Vec<String>, AgentError>;
}

/// Judges whether collected evidence answers the question.
#[async_trait]
pub trait Reflector: Send + Sync {
    /// Assesses `evidence` against `question`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the model call fails.
    async fn reflect(
        &self,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<Reflection, AgentError>;
}

/// Writes the final answer from the evidence.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Drafts an answer to `question` citing `evidence` by number.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the model call fails or returns a
    /// blank answer.
    async fn synthesize(
        &self,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<SynthesisDraft, AgentError>;
}
