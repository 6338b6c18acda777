//! Lenient parsing of JSON model output.

use std::collections::HashSet;

use serde::de::DeserializeOwned;

use crate::error::AgentError;

/// Strips a surrounding markdown code fence, if any.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// Parses a model response as JSON, tolerating code fences.
pub(crate) fn parse_json<T: DeserializeOwned>(content: &str, what: &str) -> Result<T, AgentError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| AgentError::ResponseParse {
        message: format!("Failed to parse {what}: {e}"),
        content: content.to_string(),
    })
}

/// Trims queries, drops blanks and case-insensitive repeats, and keeps at
/// most `cap` of them.
pub(crate) fn sanitize_queries(raw: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
        .take(cap)
        .collect()
}
