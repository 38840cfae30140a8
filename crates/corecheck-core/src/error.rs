//! Error taxonomy for document handling.

use std::path::PathBuf;

/// Errors produced while locating and reading documents.
#[derive(Debug, thiserror::Error)]
pub enum CorecheckError {
    #[error("could not read document {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for corecheck core operations.
pub type Result<T> = std::result::Result<T, CorecheckError>;
