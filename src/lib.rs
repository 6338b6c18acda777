//! # research-agent
//!
//! Iterative retrieval-augmented question answering.
//!
//! Given a natural-language question, research-agent generates web search
//! queries, runs them concurrently, asks a language model whether the
//! results are sufficient, optionally refines and searches again within a
//! bounded number of rounds, and finally writes a short answer with
//! de-duplicated, sequentially numbered citations.
//!
//! ## Modules
//!
//! - [`core`]: evidence set, citation remapping, error records
//! - [`search`]: search backends and the concurrent retrieval coordinator
//! - [`agent`]: LLM collaborators, run state, and the loop controller
//! - [`cli`]: command-line interface
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```no_run
//! use research_agent::agent::{AgentConfig, Orchestrator};
//!
//! # async fn demo() -> Result<(), research_agent::error::AgentError> {
//! let config = AgentConfig::from_env()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//! let report = orchestrator.run("What is the capital of France?").await?;
//! println!("{}", report.answer);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod search;

pub use crate::core::{Citation, CitationRef, Document, ErrorKind, ErrorRecord, EvidenceSet};
pub use agent::{Orchestrator, ResearchOutput, ResearchReport};
pub use error::{AgentError, CommandError, Error, Result};
