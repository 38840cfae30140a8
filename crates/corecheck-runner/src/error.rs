//! Errors raised while getting a server process off the ground.

use std::path::PathBuf;

/// Failures before the grace window starts. The validator turns every one of
/// these into a `FailedToStart` outcome.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("could not write configuration to {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spawned process has no stderr pipe")]
    MissingStderr,
}

/// Result type for launch operations.
pub type LaunchResult<T> = std::result::Result<T, LaunchError>;
