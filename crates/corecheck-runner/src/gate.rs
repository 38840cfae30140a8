//! Run gate deciding whether a pipeline step should fail.

use corecheck_core::{RunSummary, ValidationOutcome};
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// One line per failed snippet or skipped document (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Pass/fail rules over a whole run.
pub struct RunGate;

impl RunGate {
    /// Evaluate a finished run.
    ///
    /// Gate rule:
    /// - every failed snippet is a violation
    /// - every document skipped for a read error is a violation
    /// - documents without snippets are neutral
    pub fn evaluate(summary: &RunSummary) -> GateVerdict {
        let mut violations = Vec::new();

        for report in &summary.reports {
            for result in report.results.iter().filter(|r| !r.passed()) {
                let detail = match &result.outcome {
                    ValidationOutcome::FailedToStart { reason } => {
                        format!("failed to start: {}", reason)
                    }
                    ValidationOutcome::Crashed { status, .. } => format!("crashed: {}", status),
                    other => other.kind().to_string(),
                };
                violations.push(format!(
                    "{}:{}: snippet {} {}",
                    report.document.display(),
                    result.line,
                    result.index,
                    detail
                ));
            }
        }

        for skipped in &summary.skipped {
            violations.push(format!(
                "{}: not checked: {}",
                skipped.document.display(),
                skipped.reason
            ));
        }

        let passed = violations.is_empty();
        let message = if passed {
            format!(
                "All {} snippet(s) in {} document(s) passed",
                summary.total_snippets(),
                summary.reports.len()
            )
        } else {
            format!("Gate failed with {} violation(s)", violations.len())
        };

        GateVerdict {
            passed,
            violations,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corecheck_core::{DocumentReport, SkippedDocument, SnippetResult};
    use std::path::PathBuf;

    fn result(index: usize, outcome: ValidationOutcome) -> SnippetResult {
        SnippetResult {
            index,
            line: 10 + index,
            outcome,
            elapsed_ms: 500,
        }
    }

    #[test]
    fn test_empty_run_passes() {
        let verdict = RunGate::evaluate(&RunSummary::begin().finish());
        assert!(verdict.passed);
        assert!(verdict.violations.is_empty());
    }

    #[test]
    fn test_benign_outcomes_pass() {
        let mut summary = RunSummary::begin();
        summary.reports.push(DocumentReport::new(
            PathBuf::from("kubernetes.md"),
            vec![
                result(0, ValidationOutcome::Survived),
                result(
                    1,
                    ValidationOutcome::BenignExit {
                        label: "kubernetes-environment".to_string(),
                        status: "exit status: 1".to_string(),
                    },
                ),
            ],
        ));

        let verdict = RunGate::evaluate(&summary);
        assert!(verdict.passed);
        assert!(verdict.message.contains("2 snippet(s)"));
    }

    #[test]
    fn test_failures_and_skips_are_violations() {
        let mut summary = RunSummary::begin();
        summary.reports.push(DocumentReport::new(
            PathBuf::from("README.md"),
            vec![
                result(0, ValidationOutcome::Survived),
                result(
                    1,
                    ValidationOutcome::Crashed {
                        status: "exit status: 1".to_string(),
                        stderr: "Unknown directive".to_string(),
                    },
                ),
                result(
                    2,
                    ValidationOutcome::FailedToStart {
                        reason: "could not spawn ./coredns".to_string(),
                    },
                ),
            ],
        ));
        summary.skipped.push(SkippedDocument {
            document: PathBuf::from("broken.md"),
            reason: "stream did not contain valid UTF-8".to_string(),
        });

        let verdict = RunGate::evaluate(&summary);
        assert!(!verdict.passed);
        assert_eq!(verdict.violations.len(), 3);
        assert_eq!(
            verdict.violations[0],
            "README.md:11: snippet 1 crashed: exit status: 1"
        );
        assert!(verdict.violations[1].contains("failed to start"));
        assert!(verdict.violations[2].starts_with("broken.md: not checked"));
    }
}
