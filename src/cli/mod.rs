//! CLI layer for research-agent.
//!
//! Provides the command-line interface using clap, with commands for
//! asking questions and scaffolding prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
