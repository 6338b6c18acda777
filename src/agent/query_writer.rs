//! Query-writer agent.
//!
//! Turns the user's question into the first round of search queries.

use async_trait::async_trait;
use serde::Deserialize;

use super::config::AgentConfig;
use super::parse::{parse_json, sanitize_queries};
use super::prompt::build_query_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::error::AgentError;

/// Most queries kept from one generation.
pub const MAX_INITIAL_QUERIES: usize = 5;

/// Accepted response shapes: `{"queries": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum QueryPayload {
    Object { queries: Vec<String> },
    List(Vec<String>),
}

/// Agent that writes search queries for a question.
pub struct QueryWriterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl QueryWriterAgent {
    /// Creates a new query writer with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.query_model.clone(),
            max_tokens: config.query_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent and returns cleaned-up queries.
    ///
    /// An empty list is a valid outcome; the loop then searches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or unparseable output.
    pub async fn write_queries(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
    ) -> Result<Vec<String>, AgentError> {
        let response = self.execute(provider, &build_query_prompt(question)).await?;
        Self::parse_queries(&response.content)
    }

    fn parse_queries(content: &str) -> Result<Vec<String>, AgentError> {
        let raw = match parse_json::<QueryPayload>(content, "search queries")? {
            QueryPayload::Object { queries } | QueryPayload::List(queries) => queries,
        };
        Ok(sanitize_queries(raw, MAX_INITIAL_QUERIES))
    }
}

#[async_trait]
impl Agent for QueryWriterAgent {
    fn name(&self) -> &'static str {
        "query_writer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let queries = QueryWriterAgent::parse_queries(
            r#"{"queries": ["capital of France", "France capital city"]}"#,
        )
        .unwrap_or_default();
        assert_eq!(queries, vec!["capital of France", "France capital city"]);
    }

    #[test]
    fn test_parse_bare_array_in_code_block() {
        let queries =
            QueryWriterAgent::parse_queries("```json\n[\"a\", \"b\"]\n```").unwrap_or_default();
        assert_eq!(queries, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_caps_and_dedups() {
        let queries = QueryWriterAgent::parse_queries(
            r#"{"queries": ["a", "A", "b", "c", "d", "e", "f", " "]}"#,
        )
        .unwrap_or_default();
        assert_eq!(queries, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_parse_empty_list_is_ok() {
        let queries = QueryWriterAgent::parse_queries(r#"{"queries": []}"#);
        assert!(queries.is_ok_and(|q| q.is_empty()));
    }

    #[test]
    fn test_parse_invalid() {
        let result = QueryWriterAgent::parse_queries("here are some queries");
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
    }
}
