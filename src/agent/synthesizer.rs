//! Synthesizer agent.
//!
//! Writes a short answer from the numbered evidence and reports which
//! documents it relied on. Citation markers are added by the loop
//! controller after remapping, never by the model.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::collaborator::SynthesisDraft;
use super::config::AgentConfig;
use super::parse::parse_json;
use super::prompt::build_synthesizer_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::{CitationRef, EvidenceSet};
use crate::error::AgentError;

#[derive(Deserialize)]
struct DraftPayload {
    #[serde(default)]
    answer: String,
    #[serde(default, alias = "citations")]
    cited_ids: Vec<Value>,
}

/// Agent that synthesizes the final answer.
pub struct SynthesizerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SynthesizerAgent {
    /// Creates a new synthesizer agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.synthesizer_model.clone(),
            max_tokens: config.synthesizer_max_tokens,
            system_prompt,
        }
    }

    /// Executes the agent and parses the draft answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyResponse`] when the answer is blank, or
    /// another [`AgentError`] on API failures and unparseable output.
    pub async fn draft(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<SynthesisDraft, AgentError> {
        let prompt = build_synthesizer_prompt(question, evidence);
        let response = self.execute(provider, &prompt).await?;
        Self::parse_draft(&response.content)
    }

    fn parse_draft(content: &str) -> Result<SynthesisDraft, AgentError> {
        let payload: DraftPayload = parse_json(content, "synthesized answer")?;
        let answer = payload.answer.trim().to_string();
        if answer.is_empty() {
            return Err(AgentError::EmptyResponse { what: "answer" });
        }

        let cited_ids = payload
            .cited_ids
            .iter()
            .filter_map(|raw| {
                let id = CitationRef::from_json(raw);
                if id.is_none() {
                    tracing::debug!(%raw, "ignoring non-numeric citation id");
                }
                id
            })
            .collect();

        Ok(SynthesisDraft { answer, cited_ids })
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    fn name(&self) -> &'static str {
        "synthesizer"
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
