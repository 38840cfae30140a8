//! Structured tracing events for the snippet lifecycle.
//!
//! Every function logs one `event = "..."` line so JSON output can be
//! filtered on a stable key.

use std::path::Path;

use corecheck_core::{DocumentReport, ValidationOutcome};
use tracing::{debug, info, warn};

/// Span tying all log lines of one document check to that document.
pub fn document_span(document: &Path) -> tracing::Span {
    tracing::info_span!("corecheck.document", document = %document.display())
}

pub fn emit_snippet_started(index: usize, line: usize) {
    debug!(event = "snippet.started", snippet = index, line = line);
}

/// Log a terminal outcome; failures at `warn!`, everything else at `debug!`.
pub fn emit_snippet_finished(index: usize, outcome: &ValidationOutcome, elapsed_ms: u64) {
    if outcome.is_failure() {
        warn!(
            event = "snippet.finished",
            snippet = index,
            outcome = outcome.kind(),
            elapsed_ms = elapsed_ms,
        );
    } else {
        debug!(
            event = "snippet.finished",
            snippet = index,
            outcome = outcome.kind(),
            elapsed_ms = elapsed_ms,
        );
    }
}

pub fn emit_document_checked(report: &DocumentReport) {
    info!(
        event = "document.checked",
        document = %report.document.display(),
        total = report.total,
        failed = report.failed,
        verdict = %report.verdict(),
    );
}

pub fn emit_document_skipped(document: &Path, reason: &str) {
    warn!(event = "document.skipped", document = %document.display(), reason = %reason);
}
