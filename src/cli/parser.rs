//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// research-agent: answer questions from the web with cited sources.
///
/// Generates search queries, searches the web, judges whether the results
/// are enough, optionally searches again, and writes a short cited answer.
#[derive(Parser, Debug)]
#[command(name = "research-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging and run diagnostics).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text).
    #[arg(long, default_value = "json", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question using iterative web research.
    ///
    /// Prints `{"answer": ..., "citations": [...]}`. Failures of the
    /// language model or search service still produce an answer (an
    /// apology) and exit successfully.
    #[command(after_help = r#"Examples:
  research-agent ask "What is the capital of France?"
  research-agent ask "Who won the 2022 World Cup final?" --max-iter 3
  research-agent --format text ask "What is Rust's ownership model?"
  research-agent --verbose ask "Latest LTS of Ubuntu" --search-results 5
  GOOGLE_API_KEY=... TAVILY_API_KEY=... research-agent ask "..."
"#)]
    Ask {
        /// The question to answer.
        question: String,

        /// Maximum search rounds.
        #[arg(long)]
        max_iter: Option<usize>,

        /// Model for query generation.
        #[arg(long)]
        query_model: Option<String>,

        /// Model for reflection.
        #[arg(long)]
        reflect_model: Option<String>,

        /// Model for the final answer.
        #[arg(long)]
        synthesizer_model: Option<String>,

        /// Results requested from the search service per query.
        #[arg(long)]
        search_results: Option<usize>,

        /// Maximum concurrent search calls.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Directory containing prompt templates (overrides defaults).
        #[arg(long, env = "RESEARCH_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,
    },

    /// Write default prompt templates to a directory for customization.
    ///
    /// Existing files are left untouched.
    #[command(after_help = r#"Examples:
  research-agent init-prompts                     # Write to ~/.config/research-agent/prompts/
  research-agent init-prompts --dir ./my-prompts  # Write to custom directory
"#)]
    InitPrompts {
        /// Target directory (defaults to ~/.config/research-agent/prompts/).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "research-agent",
            "--format",
            "text",
            "ask",
            "What is the capital of France?",
            "--max-iter",
            "3",
        ])
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(cli.format, "text");
        match cli.command {
            Commands::Ask {
                question, max_iter, ..
            } => {
                assert_eq!(question, "What is the capital of France?");
                assert_eq!(max_iter, Some(3));
            }
            Commands::InitPrompts { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_parse_init_prompts_global_verbose() {
        let cli = Cli::try_parse_from(["research-agent", "init-prompts", "--dir", "/tmp/p", "-v"])
            .unwrap_or_else(|_| unreachable!());
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::InitPrompts { dir: Some(_) }
        ));
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["research-agent", "ask"]).is_err());
    }
}
