//! Snippet validation backends.

use async_trait::async_trait;
use corecheck_core::{ConfigSnippet, SnippetResult, ValidationOutcome};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::error::{LaunchError, LaunchResult};
use crate::process::ServerProcess;

/// Produces exactly one result per snippet. Implementations never fail as a
/// whole: problems with a snippet become its outcome.
#[async_trait]
pub trait SnippetValidator: Send + Sync {
    async fn validate(&self, snippet: &ConfigSnippet) -> SnippetResult;
}

/// Validates snippets by starting the real server for each one.
#[derive(Debug, Clone)]
pub struct ProcessValidator {
    config: ValidatorConfig,
}

impl ProcessValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Write the snippet to the scratch path and start the server on it.
    async fn launch(&self, snippet: &ConfigSnippet) -> LaunchResult<ServerProcess> {
        let path = &self.config.scratch_path;
        tokio::fs::write(path, snippet.body())
            .await
            .map_err(|source| LaunchError::WriteConfig {
                path: path.clone(),
                source,
            })?;

        ServerProcess::spawn(&self.config.command, path, self.config.quiet)
    }
}

#[async_trait]
impl SnippetValidator for ProcessValidator {
    async fn validate(&self, snippet: &ConfigSnippet) -> SnippetResult {
        let started = std::time::Instant::now();

        let (outcome, elapsed) = match self.launch(snippet).await {
            Ok(process) => {
                let pid = process.pid();
                let supervised = process
                    .supervise(self.config.grace(), self.config.stderr_limit, &self.config.rules)
                    .await;
                debug!(
                    pid = ?pid,
                    killed_by_harness = supervised.killed_by_harness,
                    "server reaped"
                );
                (supervised.outcome, supervised.elapsed)
            }
            Err(e) => (
                ValidationOutcome::FailedToStart {
                    reason: e.to_string(),
                },
                started.elapsed(),
            ),
        };

        SnippetResult {
            index: snippet.index(),
            line: snippet.line(),
            outcome,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}
