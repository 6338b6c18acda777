//! Core data types shared by the research loop and the CLI.
//!
//! Everything here is pure: evidence accumulation, citation remapping, and
//! the error records that steps append when a collaborator fails.

pub mod citation;
pub mod error_record;
pub mod evidence;

pub use citation::{Citation, CitationRef, RemappedCitations, compose_answer, remap_citations};
pub use error_record::{ErrorKind, ErrorRecord, Step};
pub use evidence::{Document, EvidenceSet, dedup_by_url};
