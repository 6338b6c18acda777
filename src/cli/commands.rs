//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::path::Path;

use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::cli::output::{OutputFormat, format_report_text};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};

/// Parameters of the `ask` command, borrowed from the parsed CLI.
#[derive(Debug, Default)]
struct AskParams<'a> {
    question: &'a str,
    max_iter: Option<usize>,
    query_model: Option<&'a str>,
    reflect_model: Option<&'a str>,
    synthesizer_model: Option<&'a str>,
    search_results: Option<usize>,
    concurrency: Option<usize>,
    prompt_dir: Option<&'a Path>,
    verbose: bool,
}

/// Executes the parsed CLI command.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the question is rejected,
/// or the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            question,
            max_iter,
            query_model,
            reflect_model,
            synthesizer_model,
            search_results,
            concurrency,
            prompt_dir,
        } => {
            let params = AskParams {
                question,
                max_iter: *max_iter,
                query_model: query_model.as_deref(),
                reflect_model: reflect_model.as_deref(),
                synthesizer_model: synthesizer_model.as_deref(),
                search_results: *search_results,
                concurrency: *concurrency,
                prompt_dir: prompt_dir.as_deref(),
                verbose: cli.verbose,
            };
            cmd_ask(&params, format)
        }
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

/// Builds agent configuration from the environment plus CLI overrides.
fn build_config(params: &AskParams<'_>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if let Some(n) = params.max_iter {
        builder = builder.max_iter(n);
    }
    if let Some(model) = params.query_model {
        builder = builder.query_model(model);
    }
    if let Some(model) = params.reflect_model {
        builder = builder.reflect_model(model);
    }
    if let Some(model) = params.synthesizer_model {
        builder = builder.synthesizer_model(model);
    }
    if let Some(n) = params.search_results {
        builder = builder.search_max_results(n);
    }
    if let Some(n) = params.concurrency {
        builder = builder.search_concurrency(n);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

fn cmd_ask(params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    let config = build_config(params)?;

    let orchestrator = Orchestrator::from_config(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let report = rt
        .block_on(orchestrator.run(params.question))
        .map_err(|e| CommandError::ExecutionFailed(format!("Question rejected: {e}")))?;

    match format {
        OutputFormat::Text => Ok(format_report_text(&report, params.verbose)),
        OutputFormat::Json if params.verbose => Ok(format.to_json(&report)),
        OutputFormat::Json => Ok(format.to_json(&report.into_output())),
    }
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str("  ");
                output.push_str(
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown"),
                );
                output.push('\n');
            }
            output.push_str("\nEdit these files to customize agent system prompts.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}
