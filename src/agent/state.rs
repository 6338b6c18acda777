//! Run state and stage transitions of the research loop.
//!
//! A run moves through [`Stage`]s. After each stage's step function has
//! produced a [`StateUpdate`] and it has been applied, [`next_stage`] picks
//! the successor from [`TRANSITIONS`], a table of pure predicates over the
//! updated state.

use serde::Serialize;

use crate::core::{Citation, ErrorRecord, EvidenceSet};

/// A stage of the research loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Turn the question into initial search queries.
    GenerateQueries,
    /// Run pending queries and merge the results into the evidence.
    WebSearch,
    /// Decide whether the evidence is sufficient.
    Reflect,
    /// Produce the final answer. Always terminal.
    Synthesize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GenerateQueries => "generate_queries",
            Self::WebSearch => "web_search",
            Self::Reflect => "reflect",
            Self::Synthesize => "synthesize",
        };
        f.write_str(name)
    }
}

/// The record threaded through one run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// The user's question.
    pub question: String,
    /// Queries waiting for the next search round.
    pub pending_queries: Vec<String>,
    /// Documents collected so far, in citation order.
    pub evidence: EvidenceSet,
    /// Latest reflection verdict.
    pub need_more: bool,
    /// Completed reflections, which equals completed search rounds.
    pub loop_count: usize,
    /// Maximum search rounds.
    pub max_iter: usize,
    /// Recorded failures. Never cleared during a run.
    pub errors: Vec<ErrorRecord>,
    /// Answer text with citation markers.
    pub final_answer: String,
    /// Remapped citations.
    pub citations: Vec<Citation>,
}

impl RunState {
    /// Creates the initial state for `question`.
    #[must_use]
    pub fn new(question: impl Into<String>, max_iter: usize) -> Self {
        Self {
            question: question.into(),
            max_iter,
            ..Self::default()
        }
    }

    /// Whether any step has recorded a failure.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Applies a step's partial update. Errors are appended, every other
    /// field present in the update replaces the current value.
    #[must_use]
    pub fn apply(mut self, update: StateUpdate) -> Self {
        if let Some(queries) = update.pending_queries {
            self.pending_queries = queries;
        }
        if let Some(evidence) = update.evidence {
            self.evidence = evidence;
        }
        if let Some(need_more) = update.need_more {
            self.need_more = need_more;
        }
        if let Some(loop_count) = update.loop_count {
            self.loop_count = loop_count;
        }
        if let Some(answer) = update.final_answer {
            self.final_answer = answer;
        }
        if let Some(citations) = update.citations {
            self.citations = citations;
        }
        self.errors.extend(update.errors);
        self
    }
}

/// Partial update returned by a step function.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// Replacement pending queries.
    pub pending_queries: Option<Vec<String>>,
    /// Replacement evidence.
    pub evidence: Option<EvidenceSet>,
    /// Replacement reflection verdict.
    pub need_more: Option<bool>,
    /// Replacement loop counter.
    pub loop_count: Option<usize>,
    /// Replacement final answer.
    pub final_answer: Option<String>,
    /// Replacement citations.
    pub citations: Option<Vec<Citation>>,
    /// Failures to append.
    pub errors: Vec<ErrorRecord>,
}

impl StateUpdate {
    /// Adds a failure to the update.
    #[must_use]
    pub fn with_error(mut self, record: ErrorRecord) -> Self {
        self.errors.push(record);
        self
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    /// Stage that just ran.
    pub from: Stage,
    /// Guard evaluated against the updated state.
    pub when: fn(&RunState) -> bool,
    /// Stage to run next.
    pub to: Stage,
}

fn has_errors(state: &RunState) -> bool {
    state.has_errors()
}

fn nothing_found(state: &RunState) -> bool {
    state.has_errors() || state.evidence.is_empty()
}

fn wants_another_round(state: &RunState) -> bool {
    state.need_more && state.loop_count < state.max_iter
}

const fn always(_: &RunState) -> bool {
    true
}

/// Transitions in evaluation order; the first matching row wins.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Stage::GenerateQueries,
        when: has_errors,
        to: Stage::Synthesize,
    },
    Transition {
        from: Stage::GenerateQueries,
        when: always,
        to: Stage::WebSearch,
    },
    Transition {
        from: Stage::WebSearch,
        when: nothing_found,
        to: Stage::Synthesize,
    },
    Transition {
        from: Stage::WebSearch,
        when: always,
        to: Stage::Reflect,
    },
    Transition {
        from: Stage::Reflect,
        when: has_errors,
        to: Stage::Synthesize,
    },
    Transition {
        from: Stage::Reflect,
        when: wants_another_round,
        to: Stage::WebSearch,
    },
    Transition {
        from: Stage::Reflect,
        when: always,
        to: Stage::Synthesize,
    },
];

/// Returns the stage following `stage`, or `None` once synthesis has run.
#[must_use]
pub fn next_stage(stage: Stage, state: &RunState) -> Option<Stage> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == stage && (t.when)(state))
        .map(|t| t.to)
}
