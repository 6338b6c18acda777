//! Run observation.
//!
//! The loop controller reports progress through [`RunObserver`] instead of
//! logging directly, so callers choose where events go.

use super::report::ResearchReport;
use super::state::{RunState, Stage};
use crate::core::ErrorRecord;

/// Receives loop events. Every method defaults to doing nothing.
pub trait RunObserver: Send + Sync {
    /// A stage is about to run.
    fn stage_started(&self, _stage: Stage, _state: &RunState) {}

    /// The controller moved from one stage to another.
    fn transition(&self, _from: Stage, _to: Stage, _state: &RunState) {}

    /// A step recorded a failure.
    fn error_recorded(&self, _record: &ErrorRecord) {}

    /// The run finished.
    fn finished(&self, _report: &ResearchReport) {}
}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn stage_started(&self, stage: Stage, state: &RunState) {
        tracing::debug!(
            %stage,
            loop_count = state.loop_count,
            pending_queries = state.pending_queries.len(),
            documents = state.evidence.len(),
            "stage started"
        );
    }

    fn transition(&self, from: Stage, to: Stage, state: &RunState) {
        tracing::debug!(
            %from,
            %to,
            need_more = state.need_more,
            errors = state.errors.len(),
            "transition"
        );
    }

    fn error_recorded(&self, record: &ErrorRecord) {
        tracing::warn!(
            step = %record.step,
            kind = %record.kind,
            message = %record.message,
            "step failed"
        );
    }

    fn finished(&self, report: &ResearchReport) {
        tracing::info!(
            search_rounds = report.search_rounds,
            documents = report.documents_collected,
            citations = report.citations.len(),
            errors = report.errors.len(),
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "research run finished"
        );
    }
}
