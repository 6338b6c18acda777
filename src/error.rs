//! Error types for research-agent.
//!
//! [`AgentError`] covers everything the research loop and its collaborators
//! can fail with. [`CommandError`] covers the CLI layer. Both fold into
//! [`Error`] for the binary entry point.

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for CLI execution.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure inside the research loop or its configuration.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Failure while executing a CLI command.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised by CLI command implementations.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not run to completion.
    #[error("command failed: {0}")]
    ExecutionFailed(String),

    /// The result could not be rendered in the requested format.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

/// Errors raised by the research loop, its configuration, and collaborators.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for the generation provider.
    #[error("no LLM API key found; set GOOGLE_API_KEY, OPENAI_API_KEY or RESEARCH_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported LLM provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The generation provider returned an error.
    #[error("LLM request failed: {message}")]
    ApiRequest {
        /// Provider error message.
        message: String,
        /// HTTP status, when the provider exposed one.
        status: Option<u16>,
    },

    /// A collaborator reported a quota or rate limit.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Collaborator error message.
        message: String,
    },

    /// A collaborator call timed out.
    #[error("request timed out: {message}")]
    Timeout {
        /// Collaborator error message.
        message: String,
    },

    /// The model output did not match the expected JSON shape.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// Parse error detail.
        message: String,
        /// Raw model output.
        content: String,
    },

    /// The model returned nothing usable.
    #[error("model returned an empty {what}")]
    EmptyResponse {
        /// Which part of the response was empty.
        what: &'static str,
    },

    /// The search collaborator failed.
    #[error("search request failed: {message}")]
    Search {
        /// Search error message.
        message: String,
        /// HTTP status, when the search service returned one.
        status: Option<u16>,
    },

    /// The research loop was used incorrectly.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// What went wrong.
        message: String,
    },
}

impl AgentError {
    /// Returns `true` if this error signals a quota or rate limit.
    ///
    /// Besides the explicit variant, an HTTP 429 status or a message that
    /// mentions `429` / `Too Many Requests` counts as a rate limit.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ApiRequest { message, status } | Self::Search { message, status } => {
                *status == Some(429) || mentions_rate_limit(message)
            }
            _ => false,
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("429") || lower.contains("too many requests") || lower.contains("rate limit")
}
