//! Iterative research loop.
//!
//! Answers a question by searching the web until the evidence is judged
//! sufficient (or the round budget runs out), then writes a short answer
//! whose citations are remapped onto a compact, ordered source list.
//!
//! # Architecture
//!
//! ```text
//! Question → Orchestrator
//!   ├── QueryGenerator (QueryWriterAgent) → initial queries
//!   ├── RetrievalCoordinator → concurrent SearchBackend calls → EvidenceSet
//!   ├── Reflector (ReflectorAgent) → need more? refined queries
//!   │   └── loops back to search while need_more && rounds < max_iter
//!   └── AnswerSynthesizer (SynthesizerAgent) → answer + cited ids
//!       └── remap_citations → "answer[1][2]" + citations
//! ```
//!
//! Any collaborator failure is recorded and routes the run to synthesis,
//! which then returns a fixed apology with no citations.

pub mod client;
pub mod collaborator;
pub mod config;
pub mod llm;
pub mod message;
pub mod observer;
pub mod orchestrator;
mod parse;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod query_writer;
pub mod reflector;
pub mod report;
pub mod state;
pub mod synthesizer;
pub mod traits;

// Re-export key types
pub use collaborator::{AnswerSynthesizer, QueryGenerator, Reflection, Reflector, SynthesisDraft};
pub use config::AgentConfig;
pub use llm::LlmCollaborators;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use observer::{RunObserver, TracingObserver};
pub use orchestrator::{Collaborators, Orchestrator};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use query_writer::QueryWriterAgent;
pub use reflector::ReflectorAgent;
pub use report::{APOLOGY, NO_INFORMATION, ResearchOutput, ResearchReport};
pub use state::{RunState, Stage, StateUpdate};
pub use synthesizer::SynthesizerAgent;
pub use traits::Agent;
