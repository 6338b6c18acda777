//! research-agent CLI entry point.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use research_agent::cli::{Cli, execute};
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stdout, clippy::print_stderr)]
fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("research_agent={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match execute(&cli).context("research-agent failed") {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
