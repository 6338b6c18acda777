//! Reflection agent.
//!
//! Decides whether the evidence gathered so far answers the question and,
//! if not, proposes refined queries.

use async_trait::async_trait;
use serde::Deserialize;

use super::collaborator::Reflection;
use super::config::AgentConfig;
use super::parse::{parse_json, sanitize_queries};
use super::prompt::build_reflect_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::EvidenceSet;
use crate::error::AgentError;

/// Most refined queries kept from one reflection.
pub const MAX_REFINED_QUERIES: usize = 3;

#[derive(Deserialize)]
struct ReflectionPayload {
    #[serde(default)]
    need_more: bool,
    #[serde(default)]
    new_queries: Option<Vec<String>>,
}

/// Agent that judges evidence sufficiency.
pub struct ReflectorAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ReflectorAgent {
    /// Creates a new reflector with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.reflect_model.clone(),
            max_tokens: config.reflect_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent and parses its verdict.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or unparseable output.
    pub async fn assess(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<Reflection, AgentError> {
        let prompt = build_reflect_prompt(question, evidence);
        let response = self.execute(provider, &prompt).await?;
        Self::parse_reflection(&response.content)
    }

    /// A "need more" verdict that comes with no usable queries is treated
    /// as sufficient, since there is nothing left to search for.
    fn parse_reflection(content: &str) -> Result<Reflection, AgentError> {
        let payload: ReflectionPayload = parse_json(content, "reflection")?;
        if !payload.need_more {
            return Ok(Reflection::sufficient());
        }
        let queries = sanitize_queries(payload.new_queries.unwrap_or_default(), MAX_REFINED_QUERIES);
        if queries.is_empty() {
            tracing::debug!("reflection asked for more evidence without queries");
            return Ok(Reflection::sufficient());
        }
        Ok(Reflection::needs(queries))
    }
}

#[async_trait]
impl Agent for ReflectorAgent {
    fn name(&self) -> &'static str {
        "reflector"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
