//! LLM-backed collaborators.
//!
//! Binds the three agents to one shared provider so the loop controller
//! can use them through the collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::create_provider;
use super::collaborator::{AnswerSynthesizer, QueryGenerator, Reflection, Reflector, SynthesisDraft};
use super::config::AgentConfig;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::query_writer::QueryWriterAgent;
use super::reflector::ReflectorAgent;
use super::synthesizer::SynthesizerAgent;
use crate::core::EvidenceSet;
use crate::error::AgentError;

/// Query writer, reflector, and synthesizer sharing one provider.
pub struct LlmCollaborators {
    provider: Arc<dyn LlmProvider>,
    query_writer: QueryWriterAgent,
    reflector: ReflectorAgent,
    synthesizer: SynthesizerAgent,
}

impl LlmCollaborators {
    /// Builds the agents from configuration, loading prompts from the
    /// configured prompt directory.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown providers.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(config)?);
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self::new(provider, config, prompts))
    }

    /// Builds the agents around an existing provider.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, prompts: PromptSet) -> Self {
        Self {
            provider,
            query_writer: QueryWriterAgent::new(config, prompts.query),
            reflector: ReflectorAgent::new(config, prompts.reflect),
            synthesizer: SynthesizerAgent::new(config, prompts.synthesizer),
        }
    }

    /// Name of the underlying provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl std::fmt::Debug for LlmCollaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCollaborators")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryGenerator for LlmCollaborators {
    async fn generate(&self, question: &str) -> Result<Vec<String>, AgentError> {
        self.query_writer
            .write_queries(self.provider.as_ref(), question)
            .await
    }
}

#[async_trait]
impl Reflector for LlmCollaborators {
    async fn reflect(
        &self,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<Reflection, AgentError> {
        self.reflector
            .assess(self.provider.as_ref(), question, evidence)
            .await
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmCollaborators {
    async fn synthesize(
        &self,
        question: &str,
        evidence: &EvidenceSet,
    ) -> Result<SynthesisDraft, AgentError> {
        self.synthesizer
            .draft(self.provider.as_ref(), question, evidence)
            .await
    }
}
