//! Citation remapping.
//!
//! The synthesis model cites evidence by its original 1-based position in
//! the prompt. Those references are untrusted: they can repeat, point past
//! the end of the evidence, or be missing entirely. [`remap_citations`]
//! resolves them into a compact list numbered by first appearance, plus the
//! `[n]` marker string appended to the answer.

use std::collections::HashMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::evidence::{Document, EvidenceSet};

/// An unvalidated reference to an evidence document, as emitted by the model.
///
/// The wrapped value is the model's claim of a 1-based evidence number. It
/// only becomes meaningful once [`CitationRef::resolve`] finds a document
/// for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationRef(i64);

impl CitationRef {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw id as emitted.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Reads a reference out of a loosely typed JSON value.
    ///
    /// Accepts integers, integral floats, and numeric strings such as `"3"`
    /// or `"[3]"`. Anything else yields `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                    .map(|f| Self(f as i64))
            }),
            serde_json::Value::String(s) => s
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .parse()
                .ok()
                .map(Self),
            _ => None,
        }
    }

    /// Resolves the reference against the evidence numbering.
    #[must_use]
    pub fn resolve(self, evidence: &EvidenceSet) -> Option<&Document> {
        usize::try_from(self.0)
            .ok()
            .and_then(|n| evidence.by_number(n))
    }
}

/// A citation in the final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Sequential id shown to the reader, starting at 1.
    pub id: usize,
    /// Source URL.
    pub url: String,
    /// Source title.
    pub title: String,
}

/// Output of [`remap_citations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemappedCitations {
    /// Unique citations in order of first appearance.
    pub citations: Vec<Citation>,
    /// Inline markers such as `[1][2][1]`, one per resolvable reference.
    pub markers: String,
}

/// Remaps model-emitted references onto sequential citation ids.
///
/// References are walked in the order given. Each one that resolves to a
/// document whose URL has not been cited yet gets the next sequential id.
/// References that resolve to an already cited URL reuse that URL's id.
/// References that do not resolve are dropped from both outputs.
#[must_use]
pub fn remap_citations(evidence: &EvidenceSet, cited: &[CitationRef]) -> RemappedCitations {
    let mut citations: Vec<Citation> = Vec::new();
    let mut ids_by_url: HashMap<&str, usize> = HashMap::new();

    for reference in cited {
        let Some(doc) = reference.resolve(evidence) else {
            continue;
        };
        if ids_by_url.contains_key(doc.url.as_str()) {
            continue;
        }
        let id = citations.len() + 1;
        ids_by_url.insert(doc.url.as_str(), id);
        citations.push(Citation {
            id,
            url: doc.url.clone(),
            title: doc.title.clone(),
        });
    }

    let mut markers = String::new();
    for reference in cited {
        if let Some(id) = reference
            .resolve(evidence)
            .and_then(|doc| ids_by_url.get(doc.url.as_str()))
        {
            let _ = write!(markers, "[{id}]");
        }
    }

    RemappedCitations { citations, markers }
}

/// Joins the answer text with its citation markers.
///
/// No separator is inserted; the result is trimmed of surrounding
/// whitespace.
#[must_use]
pub fn compose_answer(answer: &str, markers: &str) -> String {
    format!("{answer}{markers}").trim().to_string()
}
