//! Per-snippet outcomes and their per-document and per-run aggregates.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal state of one snippet's spawn/observe/kill cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Still running when the grace window closed and terminated by the harness.
    Survived,

    /// The configuration could not be written or the server could not be spawned.
    FailedToStart { reason: String },

    /// Exited inside the grace window for a reason no rule excuses.
    Crashed { status: String, stderr: String },

    /// Exited inside the grace window, but cleanly or for a recognised
    /// environment reason.
    BenignExit { label: String, status: String },
}

impl ValidationOutcome {
    /// Whether this outcome counts against the document.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ValidationOutcome::FailedToStart { .. } | ValidationOutcome::Crashed { .. }
        )
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationOutcome::Survived => "survived",
            ValidationOutcome::FailedToStart { .. } => "failed_to_start",
            ValidationOutcome::Crashed { .. } => "crashed",
            ValidationOutcome::BenignExit { .. } => "benign_exit",
        }
    }
}

/// Outcome of one snippet plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetResult {
    /// Position of the snippet in its document.
    pub index: usize,

    /// Line of the opening fence.
    pub line: usize,

    pub outcome: ValidationOutcome,

    /// Time from spawn until the process was reaped, in milliseconds.
    pub elapsed_ms: u64,
}

impl SnippetResult {
    pub fn passed(&self) -> bool {
        !self.outcome.is_failure()
    }
}

/// Pass/fail verdict of a document or a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Tally for a single document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReport {
    pub document: PathBuf,
    pub total: usize,
    pub failed: usize,
    pub results: Vec<SnippetResult>,
}

impl DocumentReport {
    pub fn new(document: PathBuf, results: Vec<SnippetResult>) -> Self {
        let total = results.len();
        let failed = results.iter().filter(|r| !r.passed()).count();
        Self {
            document,
            total,
            failed,
            results,
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.failed == 0 {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict() == Verdict::Pass
    }
}

/// A document that could not be read and was left out of the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedDocument {
    pub document: PathBuf,
    pub reason: String,
}

/// Everything a run over one directory produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Reports for documents that contained at least one snippet.
    pub reports: Vec<DocumentReport>,

    pub skipped: Vec<SkippedDocument>,
}

impl RunSummary {
    /// Start an empty summary stamped with a fresh run id.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            reports: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Stamp the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn total_snippets(&self) -> usize {
        self.reports.iter().map(|r| r.total).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.reports.iter().map(|r| r.failed).sum()
    }

    pub fn failed_documents(&self) -> impl Iterator<Item = &DocumentReport> {
        self.reports.iter().filter(|r| !r.passed())
    }
}
