//! corecheck core library
//!
//! Pulls `corefile` examples out of markdown documents and models what
//! happened when each one was handed to the server:
//! - [`snippet`]: fenced block extraction
//! - [`discovery`]: which documents to look at
//! - [`classify`]: benign-exit rule table
//! - [`outcome`]: per-snippet outcomes, document reports, run summaries

pub mod classify;
pub mod discovery;
pub mod error;
pub mod outcome;
pub mod snippet;
pub mod telemetry;

pub use classify::{
    Classification, ClassificationRule, EarlyExit, MatchTarget, RuleSet, CLEAN_EXIT_LABEL,
    KUBERNETES_ENV_MARKER,
};
pub use discovery::{discover_documents, DOCUMENT_EXTENSION};
pub use error::{CorecheckError, Result};
pub use outcome::{
    DocumentReport, RunSummary, SkippedDocument, SnippetResult, ValidationOutcome, Verdict,
};
pub use snippet::{
    extract_from_file, extract_snippets, read_snippets, ConfigSnippet, FenceStyle,
    CONFIG_LANGUAGE,
};
pub use telemetry::init_tracing;

/// corecheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
