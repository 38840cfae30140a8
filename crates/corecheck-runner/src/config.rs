//! Per-call validator configuration.

use std::path::PathBuf;
use std::time::Duration;

use corecheck_core::RuleSet;
use serde::{Deserialize, Serialize};

use crate::command::ServerCommand;

/// How long a server must stay up before it counts as started.
pub const DEFAULT_GRACE_MS: u64 = 500;

/// Bytes of stderr kept for classification.
pub const DEFAULT_STDERR_LIMIT: usize = 2048;

/// File name of the scratch configuration inside the temp directory.
pub const SCRATCH_FILE_NAME: &str = "corefile-readme";

/// Everything one validation needs, passed explicitly on every call.
///
/// The scratch path is rewritten for each snippet, so two validators sharing
/// a scratch path must not run at the same time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorConfig {
    pub command: ServerCommand,

    /// Grace window in milliseconds.
    pub grace_ms: u64,

    pub stderr_limit: usize,

    /// Where each snippet is written before the server is started.
    pub scratch_path: PathBuf,

    /// Discard the server's stdout instead of passing it through.
    pub quiet: bool,

    pub rules: RuleSet,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            command: ServerCommand::default(),
            grace_ms: DEFAULT_GRACE_MS,
            stderr_limit: DEFAULT_STDERR_LIMIT,
            scratch_path: default_scratch_path(),
            quiet: true,
            rules: RuleSet::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            ..Self::default()
        }
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// `<temp dir>/corefile-readme`
pub fn default_scratch_path() -> PathBuf {
    std::env::temp_dir().join(SCRATCH_FILE_NAME)
}
