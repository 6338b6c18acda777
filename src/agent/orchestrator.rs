//! Loop controller for the research workflow.
//!
//! Drives a question through query generation → search → reflection →
//! (search again | synthesize). Each stage runs a step function over an
//! immutable snapshot of the [`RunState`] and returns a [`StateUpdate`];
//! the successor stage comes from the transition table in
//! [`super::state`].
//!
//! Collaborator failures never escape a run. They become [`ErrorRecord`]s,
//! which route the run straight to synthesis and the apology answer.

use std::sync::Arc;
use std::time::Instant;

use super::collaborator::{AnswerSynthesizer, QueryGenerator, Reflector};
use super::config::AgentConfig;
use super::llm::LlmCollaborators;
use super::observer::{RunObserver, TracingObserver};
use super::report::{APOLOGY, NO_INFORMATION, ResearchReport};
use super::state::{RunState, Stage, StateUpdate, next_stage};
use crate::core::{ErrorRecord, Step, compose_answer, remap_citations};
use crate::error::AgentError;
use crate::search::{RetrievalCoordinator, SearchBackend, create_search_backend};

/// Longest accepted question, in bytes.
const MAX_QUESTION_LEN: usize = 10_000;

/// The external services a run depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Writes the initial search queries.
    pub queries: Arc<dyn QueryGenerator>,
    /// Runs individual search queries.
    pub search: Arc<dyn SearchBackend>,
    /// Judges evidence sufficiency.
    pub reflector: Arc<dyn Reflector>,
    /// Writes the final answer.
    pub synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl Collaborators {
    /// Builds LLM-backed collaborators and the configured search backend.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown providers.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let llm = Arc::new(LlmCollaborators::from_config(config)?);
        Ok(Self {
            queries: llm.clone(),
            search: create_search_backend(config),
            reflector: llm.clone(),
            synthesizer: llm,
        })
    }
}

/// Runs research questions to completion.
pub struct Orchestrator {
    collaborators: Collaborators,
    retrieval: RetrievalCoordinator,
    max_iter: usize,
    observer: Arc<dyn RunObserver>,
}

impl Orchestrator {
    /// Creates an orchestrator that performs at most `max_iter` search
    /// rounds per question, with at most `search_concurrency` searches in
    /// flight. A `max_iter` of zero is raised to one, since the first
    /// round always runs.
    #[must_use]
    pub fn new(collaborators: Collaborators, max_iter: usize, search_concurrency: usize) -> Self {
        let retrieval = RetrievalCoordinator::new(collaborators.search.clone(), search_concurrency);
        Self {
            collaborators,
            retrieval,
            max_iter: max_iter.max(1),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Creates an orchestrator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the collaborators cannot be built.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let collaborators = Collaborators::from_config(config)?;
        Ok(Self::new(
            collaborators,
            config.max_iter,
            config.search_concurrency,
        ))
    }

    /// Replaces the default [`TracingObserver`].
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Answers `question`.
    ///
    /// Collaborator failures do not produce an `Err`; they end the run with
    /// the apology answer and are listed in [`ResearchReport::errors`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] if the question is blank or
    /// longer than 10,000 bytes.
    pub async fn run(&self, question: &str) -> Result<ResearchReport, AgentError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::Orchestration {
                message: "Question cannot be empty".to_string(),
            });
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(AgentError::Orchestration {
                message: format!(
                    "Question exceeds maximum length ({} bytes, max {MAX_QUESTION_LEN})",
                    question.len()
                ),
            });
        }

        let start = Instant::now();
        let mut state = RunState::new(question, self.max_iter);
        let mut stage = Stage::GenerateQueries;
        let mut search_rounds = 0;

        loop {
            self.observer.stage_started(stage, &state);

            let update = match stage {
                Stage::GenerateQueries => self.generate_queries(&state).await,
                Stage::WebSearch => {
                    search_rounds += 1;
                    self.web_search(&state).await
                }
                Stage::Reflect => self.reflect(&state).await,
                Stage::Synthesize => self.synthesize(&state).await,
            };

            for record in &update.errors {
                self.observer.error_recorded(record);
            }
            state = state.apply(update);

            match next_stage(stage, &state) {
                Some(next) => {
                    self.observer.transition(stage, next, &state);
                    stage = next;
                }
                None => break,
            }
        }

        let report = ResearchReport::from_state(state, search_rounds, start.elapsed());
        self.observer.finished(&report);
        Ok(report)
    }

    async fn generate_queries(&self, state: &RunState) -> StateUpdate {
        match self.collaborators.queries.generate(&state.question).await {
            Ok(queries) => StateUpdate {
                pending_queries: Some(queries),
                ..StateUpdate::default()
            },
            Err(e) => StateUpdate {
                pending_queries: Some(Vec::new()),
                ..StateUpdate::default()
            }
            .with_error(ErrorRecord::from_error(Step::Generate, &e)),
        }
    }

    /// Runs the pending queries. A round fails only when every query
    /// failed; partial failures just contribute no documents.
    async fn web_search(&self, state: &RunState) -> StateUpdate {
        let batch = self.retrieval.retrieve(&state.pending_queries).await;
        let update = StateUpdate {
            pending_queries: Some(Vec::new()),
            ..StateUpdate::default()
        };

        match batch.into_result() {
            Ok(documents) => StateUpdate {
                evidence: Some(state.evidence.clone().merge(documents)),
                ..update
            },
            Err(e) => update.with_error(ErrorRecord::from_error(Step::Search, &e)),
        }
    }

    async fn reflect(&self, state: &RunState) -> StateUpdate {
        let loop_count = Some(state.loop_count + 1);
        match self
            .collaborators
            .reflector
            .reflect(&state.question, &state.evidence)
            .await
        {
            Ok(reflection) => StateUpdate {
                need_more: Some(reflection.need_more),
                pending_queries: Some(reflection.new_queries),
                loop_count,
                ..StateUpdate::default()
            },
            Err(e) => StateUpdate {
                need_more: Some(false),
                loop_count,
                ..StateUpdate::default()
            }
            .with_error(ErrorRecord::from_error(Step::Reflect, &e)),
        }
    }

    async fn synthesize(&self, state: &RunState) -> StateUpdate {
        let fixed = |text: &str| StateUpdate {
            final_answer: Some(text.to_string()),
            citations: Some(Vec::new()),
            ..StateUpdate::default()
        };

        if state.has_errors() {
            return fixed(APOLOGY);
        }
        if state.evidence.is_empty() {
            return fixed(NO_INFORMATION);
        }

        match self
            .collaborators
            .synthesizer
            .synthesize(&state.question, &state.evidence)
            .await
        {
            Ok(draft) => {
                let remapped = remap_citations(&state.evidence, &draft.cited_ids);
                StateUpdate {
                    final_answer: Some(compose_answer(&draft.answer, &remapped.markers)),
                    citations: Some(remapped.citations),
                    ..StateUpdate::default()
                }
            }
            Err(e) => fixed(APOLOGY).with_error(ErrorRecord::from_error(Step::Synthesize, &e)),
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("search", &self.collaborators.search.name())
            .field("max_iter", &self.max_iter)
            .field("retrieval", &self.retrieval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::collaborator::{Reflection, SynthesisDraft};
    use crate::core::{CitationRef, Document, ErrorKind, EvidenceSet};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted stand-in for every collaborator.
    struct Script {
        queries: Result<Vec<String>, fn() -> AgentError>,
        rounds: Vec<Vec<Document>>,
        search_error: Option<fn() -> AgentError>,
        need_more: bool,
        draft: Result<(String, Vec<i64>), fn() -> AgentError>,
        searches: AtomicUsize,
        reflections: AtomicUsize,
        seen_evidence: Mutex<Vec<usize>>,
    }

    impl Script {
        fn new(rounds: Vec<Vec<Document>>) -> Self {
            Self {
                queries: Ok(vec!["q1".to_string()]),
                rounds,
                search_error: None,
                need_more: false,
                draft: Ok(("Answer.".to_string(), vec![1])),
                searches: AtomicUsize::new(0),
                reflections: AtomicUsize::new(0),
                seen_evidence: Mutex::new(Vec::new()),
            }
        }
    }

    fn orchestrator(script: &Arc<Script>, max_iter: usize) -> Orchestrator {
        let collaborators = Collaborators {
            queries: script.clone(),
            search: script.clone(),
            reflector: script.clone(),
            synthesizer: script.clone(),
        };
        Orchestrator::new(collaborators, max_iter, 4)
    }

    #[async_trait]
    impl QueryGenerator for Script {
        async fn generate(&self, _question: &str) -> Result<Vec<String>, AgentError> {
            self.queries.clone().map_err(|make| make())
        }
    }

    #[async_trait]
    impl SearchBackend for Script {
        fn name(&self) -> &'static str {
            "script"
        }

        async fn search(&self, _query: &str) -> Result<Vec<Document>, AgentError> {
            let round = self.searches.fetch_add(1, Ordering::SeqCst);
            if let Some(make) = self.search_error {
                return Err(make());
            }
            Ok(self.rounds.get(round).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl Reflector for Script {
        async fn reflect(
            &self,
            _question: &str,
            evidence: &EvidenceSet,
        ) -> Result<Reflection, AgentError> {
            self.reflections.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen_evidence.lock() {
                seen.push(evidence.len());
            }
            if self.need_more {
                Ok(Reflection::needs(vec!["refined".to_string()]))
            } else {
                Ok(Reflection::sufficient())
            }
        }
    }

    #[async_trait]
    impl AnswerSynthesizer for Script {
        async fn synthesize(
            &self,
            _question: &str,
            _evidence: &EvidenceSet,
        ) -> Result<SynthesisDraft, AgentError> {
            match &self.draft {
                Ok((answer, ids)) => Ok(SynthesisDraft {
                    answer: answer.clone(),
                    cited_ids: ids.iter().copied().map(CitationRef::new).collect(),
                }),
                Err(make) => Err(make()),
            }
        }
    }

    fn docs(urls: &[&str]) -> Vec<Document> {
        urls.iter()
            .map(|u| Document::new(*u, format!("title {u}"), format!("content {u}")))
            .collect()
    }

    #[tokio::test]
    async fn test_rejects_blank_question() {
        let script = Arc::new(Script::new(Vec::new()));
        let result = orchestrator(&script, 2).run("   ").await;
        assert!(matches!(result, Err(AgentError::Orchestration { .. })));
        assert_eq!(script.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejects_oversized_question() {
        let script = Arc::new(Script::new(Vec::new()));
        let question = "x".repeat(MAX_QUESTION_LEN + 1);
        let result = orchestrator(&script, 2).run(&question).await;
        assert!(matches!(result, Err(AgentError::Orchestration { .. })));
    }

    #[tokio::test]
    async fn test_single_round_answer() {
        let script = Arc::new(Script::new(vec![docs(&["https://a", "https://b"])]));
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer, "Answer.[1]");
        assert_eq!(report.citations.len(), 1);
        assert_eq!(report.search_rounds, 1);
        assert_eq!(report.loop_count, 1);
        assert_eq!(report.documents_collected, 2);
        assert!(!report.failed());
    }

    #[tokio::test]
    async fn test_evidence_accumulates_across_rounds() {
        let mut script = Script::new(vec![
            docs(&["https://a", "https://b"]),
            docs(&["https://b", "https://c"]),
        ]);
        script.need_more = true;
        let script = Arc::new(script);
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.search_rounds, 2);
        assert_eq!(report.documents_collected, 3);
        assert!(report.need_more);
        let seen = script.seen_evidence.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_zero_max_iter_still_searches_once() {
        let mut script = Script::new(vec![docs(&["https://a"])]);
        script.need_more = true;
        let script = Arc::new(script);
        let report = orchestrator(&script, 0)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.search_rounds, 1);
    }

    #[tokio::test]
    async fn test_generate_failure_skips_search() {
        let mut script = Script::new(vec![docs(&["https://a"])]);
        script.queries = Err(|| AgentError::RateLimited {
            message: "quota".to_string(),
        });
        let script = Arc::new(script);
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer, APOLOGY);
        assert_eq!(script.searches.load(Ordering::SeqCst), 0);
        assert_eq!(report.errors[0].step, Step::Generate);
        assert_eq!(report.errors[0].kind, ErrorKind::RateLimit);
    }

    #[tokio::test]
    async fn test_empty_query_list_finds_nothing() {
        let mut script = Script::new(vec![docs(&["https://a"])]);
        script.queries = Ok(Vec::new());
        let script = Arc::new(script);
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer, NO_INFORMATION);
        assert_eq!(script.searches.load(Ordering::SeqCst), 0);
        assert_eq!(script.reflections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_records_error() {
        let mut script = Script::new(vec![docs(&["https://a"])]);
        script.draft = Err(|| AgentError::EmptyResponse { what: "answer" });
        let script = Arc::new(script);
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer, APOLOGY);
        assert!(report.citations.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].step, Step::Synthesize);
        assert_eq!(report.errors[0].kind, ErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_search_failure_reports_no_reflection() {
        let mut script = Script::new(Vec::new());
        script.search_error = Some(|| AgentError::Search {
            message: "HTTP 500".to_string(),
            status: Some(500),
        });
        let script = Arc::new(script);
        let report = orchestrator(&script, 2)
            .run("question")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.answer, APOLOGY);
        assert_eq!(report.errors[0].kind, ErrorKind::HttpError);
        assert_eq!(script.reflections.load(Ordering::SeqCst), 0);
    }
}
