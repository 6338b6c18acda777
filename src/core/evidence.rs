//! Retrieved documents and the accumulated evidence set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A document returned by the search collaborator.
///
/// Identity is the `url`; two documents with the same URL are the same
/// piece of evidence regardless of title or content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source URL (identity key).
    pub url: String,
    /// Page title.
    pub title: String,
    /// Extracted text content or snippet.
    pub content: String,
}

impl Document {
    /// Creates a document.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Ordered, URL-unique collection of documents gathered across search rounds.
///
/// Insertion order is significant: position `i` (0-based) is presented to
/// the synthesis step as citation `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvidenceSet {
    documents: Vec<Document>,
}

impl EvidenceSet {
    /// Creates an empty evidence set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// Builds an evidence set from documents, dropping later URL duplicates.
    #[must_use]
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self::new().merge(documents)
    }

    /// Appends `new_docs` after the existing documents.
    ///
    /// A document whose URL is already present (either from an earlier
    /// round or earlier in `new_docs`) is discarded; existing entries are
    /// never replaced.
    #[must_use]
    pub fn merge(mut self, new_docs: impl IntoIterator<Item = Document>) -> Self {
        let mut seen: HashSet<String> = self.documents.iter().map(|d| d.url.clone()).collect();
        for doc in new_docs {
            if seen.insert(doc.url.clone()) {
                self.documents.push(doc);
            }
        }
        self
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the document at 0-based `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Returns the document with the given 1-based citation number.
    #[must_use]
    pub fn by_number(&self, number: usize) -> Option<&Document> {
        number.checked_sub(1).and_then(|i| self.documents.get(i))
    }

    /// Returns `true` if a document with `url` is present.
    #[must_use]
    pub fn contains_url(&self, url: &str) -> bool {
        self.documents.iter().any(|d| d.url == url)
    }

    /// Iterates documents in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Iterates `(number, document)` pairs using 1-based citation numbering.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Document)> {
        self.documents.iter().enumerate().map(|(i, d)| (i + 1, d))
    }

    /// Borrows the documents as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Document] {
        &self.documents
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Drops documents whose URL already appeared earlier in `docs`.
///
/// Keeps the first occurrence and the order in which unique URLs were first
/// seen.
#[must_use]
pub fn dedup_by_url(docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
    let mut seen = HashSet::new();
    docs.into_iter()
        .filter(|d| seen.insert(d.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(url: &str, title: &str) -> Document {
        Document::new(url, title, format!("content of {title}"))
    }

    #[test]
    fn test_merge_appends_in_order() {
        let set = EvidenceSet::new().merge(vec![doc("u1", "A"), doc("u2", "B")]);
        let set = set.merge(vec![doc("u3", "C")]);
        let urls: Vec<&str> = set.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_merge_existing_wins() {
        let set = EvidenceSet::from_documents(vec![doc("u1", "first")]);
        let set = set.merge(vec![doc("u1", "second"), doc("u2", "B")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).map(|d| d.title.as_str()), Some("first"));
    }

    #[test]
    fn test_merge_same_document_twice() {
        let d = doc("u1", "A");
        let set = EvidenceSet::new().merge(vec![d.clone()]).merge(vec![d]);
        assert_eq!(set.len(), 1);
        assert!(set.contains_url("u1"));
    }

    #[test]
    fn test_merge_dedups_within_batch() {
        let set = EvidenceSet::new().merge(vec![doc("u1", "A"), doc("u1", "A2")]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).map(|d| d.title.as_str()), Some("A"));
    }

    #[test]
    fn test_by_number_is_one_based() {
        let set = EvidenceSet::from_documents(vec![doc("u1", "A"), doc("u2", "B")]);
        assert_eq!(set.by_number(1).map(|d| d.url.as_str()), Some("u1"));
        assert_eq!(set.by_number(2).map(|d| d.url.as_str()), Some("u2"));
        assert!(set.by_number(0).is_none());
        assert!(set.by_number(3).is_none());
    }

    #[test]
    fn test_numbered() {
        let set = EvidenceSet::from_documents(vec![doc("u1", "A"), doc("u2", "B")]);
        let numbers: Vec<usize> = set.numbered().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_dedup_by_url_first_wins() {
        let docs = dedup_by_url(vec![doc("u2", "B"), doc("u1", "A"), doc("u2", "B2")]);
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let set = EvidenceSet::from_documents(vec![doc("u1", "A")]);
        let json = serde_json::to_value(&set).unwrap_or_default();
        assert!(json.is_array());
    }

    proptest! {
        #[test]
        fn prop_merge_keeps_urls_unique(urls in proptest::collection::vec(0u8..8, 0..40)) {
            let docs: Vec<Document> = urls
                .iter()
                .enumerate()
                .map(|(i, u)| doc(&format!("u{u}"), &format!("t{i}")))
                .collect();
            let (left, right) = docs.split_at(docs.len() / 2);
            let set = EvidenceSet::new().merge(left.to_vec()).merge(right.to_vec());

            let mut seen = HashSet::new();
            prop_assert!(set.iter().all(|d| seen.insert(d.url.clone())));

            // Each URL keeps the title of its first occurrence.
            for kept in &set {
                let first = docs.iter().find(|d| d.url == kept.url);
                prop_assert_eq!(first.map(|d| &d.title), Some(&kept.title));
            }
        }

        #[test]
        fn prop_merge_is_idempotent(urls in proptest::collection::vec(0u8..8, 0..20)) {
            let docs: Vec<Document> = urls.iter().map(|u| doc(&format!("u{u}"), "t")).collect();
            let once = EvidenceSet::new().merge(docs.clone());
            let twice = once.clone().merge(docs);
            prop_assert_eq!(once, twice);
        }
    }
}
