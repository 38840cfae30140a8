//! corecheck - documentation snippet liveness checker
//!
//! Scans a directory for markdown documents, pulls out every
//! `~~~ corefile` / ```` ``` corefile ```` example and starts the server with
//! each one. A document passes when every example keeps the server alive
//! through the grace window.
//!
//! The process exits with status 1 when any snippet failed or any document
//! could not be read, so it can gate a pipeline step.

use anyhow::{Context, Result};
use clap::Parser;
use corecheck_core::{
    ConfigSnippet, DocumentReport, SkippedDocument, SnippetResult, ValidationOutcome,
};
use corecheck_runner::{
    default_scratch_path, GateVerdict, Harness, HarnessHandler, ProcessValidator, RunGate,
    ServerCommand, ValidatorConfig, DEFAULT_GRACE_MS,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "corecheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check that every corefile example in the docs starts the server", long_about = None)]
struct Cli {
    /// Directory to scan for .md files
    #[arg(long, env = "CORECHECK_DIR", default_value = ".")]
    dir: PathBuf,

    /// Path to the server executable
    #[arg(long, env = "CORECHECK_EXE", default_value = "./coredns")]
    exe: PathBuf,

    /// Argument placed before the configuration flags (repeatable)
    #[arg(long = "exe-arg", allow_hyphen_values = true)]
    exe_args: Vec<String>,

    /// How long each server must stay up, in milliseconds
    #[arg(long, env = "CORECHECK_GRACE_MS", default_value_t = DEFAULT_GRACE_MS)]
    grace_ms: u64,

    /// Scratch file the snippet is written to (default: <tmp>/corefile-readme)
    #[arg(long, env = "CORECHECK_SCRATCH")]
    scratch: Option<PathBuf>,

    /// Port handed to the server
    #[arg(long, default_value = "0")]
    port: String,

    /// Pass the server's stdout through instead of discarding it
    #[arg(long)]
    show_server_output: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn validator_config(&self) -> ValidatorConfig {
        let command = self
            .exe_args
            .iter()
            .fold(ServerCommand::new(&self.exe), |cmd, arg| cmd.wrapper_arg(arg))
            .with_port(&self.port);

        ValidatorConfig {
            grace_ms: self.grace_ms,
            scratch_path: self.scratch.clone().unwrap_or_else(default_scratch_path),
            quiet: !self.show_server_output,
            ..ValidatorConfig::new(command)
        }
    }
}

/// Prints the human-readable progress and summary lines.
struct ConsoleHandler;

impl HarnessHandler for ConsoleHandler {
    fn on_document_start(&self, document: &Path, snippets: usize) {
        println!("Checking {} snippets in {}", snippets, document.display());
    }

    fn on_snippet(&self, document: &Path, snippet: &ConfigSnippet, result: &SnippetResult) {
        if let Some(message) = failure_message(document, snippet, result) {
            println!("{}", message);
        }
    }

    fn on_document_finish(&self, report: &DocumentReport) {
        println!("{}", summary_line(report));
    }

    fn on_document_skipped(&self, skipped: &SkippedDocument) {
        println!("Skipping {}: {}", skipped.document.display(), skipped.reason);
    }
}

/// Diagnostic for a failed snippet, `None` when it passed.
fn failure_message(
    document: &Path,
    snippet: &ConfigSnippet,
    result: &SnippetResult,
) -> Option<String> {
    match &result.outcome {
        ValidationOutcome::FailedToStart { reason } => Some(format!(
            "Failed to start server with {}, for input {:?}:\n{}",
            document.display(),
            snippet.body(),
            reason
        )),
        ValidationOutcome::Crashed { status, stderr } => Some(format!(
            "Failed to start server with {} (line {}): {}, standard error {:?}\n{}",
            document.display(),
            snippet.line(),
            status,
            stderr,
            snippet.body()
        )),
        ValidationOutcome::Survived | ValidationOutcome::BenignExit { .. } => None,
    }
}

fn summary_line(report: &DocumentReport) -> String {
    if report.passed() {
        format!("\tPASS: {} snippets in {}", report.total, report.document.display())
    } else {
        format!(
            "\tFAIL: {} snippets in {}: {} failed",
            report.total,
            report.document.display(),
            report.failed
        )
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    corecheck_core::init_tracing(cli.json, level);

    let verdict = run(&cli).await?;
    if verdict.passed {
        info!("{}", verdict.message);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", verdict.message);
        for violation in &verdict.violations {
            println!("  - {}", violation);
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Check every document under `--dir`, write the report if asked, and gate.
async fn run(cli: &Cli) -> Result<GateVerdict> {
    let config = cli.validator_config();
    info!(
        exe = %config.command.program.display(),
        grace_ms = config.grace_ms,
        scratch = %config.scratch_path.display(),
        "corecheck starting"
    );

    let harness = Harness::new(Arc::new(ProcessValidator::new(config)))
        .with_handler(Arc::new(ConsoleHandler));
    let summary = harness
        .check_directory(&cli.dir)
        .await
        .with_context(|| format!("Could not check documents in {}", cli.dir.display()))?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(RunGate::evaluate(&summary))
}
