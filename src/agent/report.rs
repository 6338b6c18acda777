//! Outcome of a research run.

use std::time::Duration;

use serde::Serialize;

use super::state::RunState;
use crate::core::{Citation, ErrorRecord};

/// Answer returned when any step recorded a failure.
pub const APOLOGY: &str = "I'm unable to provide a complete answer at this time because of an error. Please try again later.";

/// Answer returned when searching produced no documents.
pub const NO_INFORMATION: &str = "No information found.";

/// The externally visible artifact of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchOutput {
    /// Answer text with trailing citation markers.
    pub answer: String,
    /// Citations referenced by the markers.
    pub citations: Vec<Citation>,
}

/// Full result of a run, including diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    /// Answer text with trailing citation markers.
    pub answer: String,
    /// Citations referenced by the markers.
    pub citations: Vec<Citation>,
    /// Final reflection verdict.
    pub need_more: bool,
    /// Reflections performed.
    pub loop_count: usize,
    /// Search rounds performed.
    pub search_rounds: usize,
    /// Distinct documents held at synthesis time.
    pub documents_collected: usize,
    /// Failures recorded during the run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
    /// Total elapsed time.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

impl ResearchReport {
    /// Builds a report from the final run state.
    #[must_use]
    pub fn from_state(state: RunState, search_rounds: usize, elapsed: Duration) -> Self {
        Self {
            answer: state.final_answer,
            citations: state.citations,
            need_more: state.need_more,
            loop_count: state.loop_count,
            search_rounds,
            documents_collected: state.evidence.len(),
            errors: state.errors,
            elapsed,
        }
    }

    /// Whether the run ended on the apology path.
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drops diagnostics, keeping the answer and citations.
    #[must_use]
    pub fn into_output(self) -> ResearchOutput {
        ResearchOutput {
            answer: self.answer,
            citations: self.citations,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
