//! Recorded step failures.
//!
//! A research run never aborts on a collaborator failure. The failing step
//! appends an [`ErrorRecord`] instead, and any recorded error routes the run
//! straight to the apology answer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Loop step that recorded an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Query generation.
    Generate,
    /// Web search.
    Search,
    /// Sufficiency reflection.
    Reflect,
    /// Answer synthesis.
    Synthesize,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generate => "generate",
            Self::Search => "search",
            Self::Reflect => "reflect",
            Self::Synthesize => "synthesize",
        };
        f.write_str(name)
    }
}

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Quota or rate limit reached.
    RateLimit,
    /// A collaborator call timed out.
    Timeout,
    /// A collaborator returned nothing usable.
    EmptyResult,
    /// Generic generation-collaborator failure.
    #[serde(rename = "LLMFailure")]
    LlmFailure,
    /// Generic search-collaborator failure.
    #[serde(rename = "HTTPError")]
    HttpError,
    /// Anything else.
    UnknownError,
}

impl ErrorKind {
    /// Classifies an error raised while running `step`.
    ///
    /// Rate limits and timeouts keep their own category regardless of the
    /// step. Search failures are otherwise `HttpError` and generation
    /// failures are otherwise `LlmFailure`.
    #[must_use]
    pub fn classify(step: Step, error: &AgentError) -> Self {
        if error.is_rate_limit() {
            return Self::RateLimit;
        }
        match error {
            AgentError::Timeout { .. } => Self::Timeout,
            AgentError::EmptyResponse { .. } => Self::EmptyResult,
            AgentError::Search { .. } => Self::HttpError,
            AgentError::ApiRequest { .. } | AgentError::ResponseParse { .. } => {
                if step == Step::Search {
                    Self::HttpError
                } else {
                    Self::LlmFailure
                }
            }
            _ => Self::UnknownError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RateLimit => "RateLimit",
            Self::Timeout => "Timeout",
            Self::EmptyResult => "EmptyResult",
            Self::LlmFailure => "LLMFailure",
            Self::HttpError => "HTTPError",
            Self::UnknownError => "UnknownError",
        };
        f.write_str(name)
    }
}

/// A failure recorded by a loop step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Step that failed.
    pub step: Step,
    /// Failure category.
    pub kind: ErrorKind,
    /// Diagnostic detail. Never shown in the answer text.
    pub message: String,
}

impl ErrorRecord {
    /// Builds a record from an error raised during `step`.
    #[must_use]
    pub fn from_error(step: Step, error: &AgentError) -> Self {
        Self {
            step,
            kind: ErrorKind::classify(step, error),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.step, self.kind, self.message)
    }
}
