//! Benign-exit classification rules.
//!
//! A server that exits inside the grace window is a failure unless it exited
//! cleanly or one of the rules recognises the exit as an environment
//! precondition rather than a defect in the example.

use serde::{Deserialize, Serialize};

/// Printed by the kubernetes plugin when it is started outside a cluster.
pub const KUBERNETES_ENV_MARKER: &str =
    "KUBERNETES_SERVICE_HOST and KUBERNETES_SERVICE_PORT must be defined";

/// Which piece of the early exit a rule inspects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchTarget {
    /// Captured stderr of the server.
    Diagnostics,
    /// Rendered exit status, e.g. `exit status: 1`.
    ExitStatus,
}

/// A substring signature that marks an exit as benign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Short name reported in the outcome.
    pub label: String,

    /// Substring searched for in the target text.
    pub pattern: String,

    pub target: MatchTarget,
}

impl ClassificationRule {
    pub fn new(label: impl Into<String>, pattern: impl Into<String>, target: MatchTarget) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
            target,
        }
    }

    fn matches(&self, exit: &EarlyExit<'_>) -> bool {
        let haystack = match self.target {
            MatchTarget::Diagnostics => exit.diagnostics,
            MatchTarget::ExitStatus => exit.status,
        };
        haystack.contains(&self.pattern)
    }
}

/// What the observer saw when the server exited on its own.
#[derive(Debug, Clone, Copy)]
pub struct EarlyExit<'a> {
    /// Whether the exit status reported success.
    pub success: bool,
    pub status: &'a str,
    pub diagnostics: &'a str,
}

/// Classification of an early exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Benign { label: String },
    Failure,
}

/// Label used for a zero exit status inside the grace window.
pub const CLEAN_EXIT_LABEL: &str = "clean-exit";

/// Ordered table of benign signatures; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty().with_rule(ClassificationRule::new(
            "kubernetes-environment",
            KUBERNETES_ENV_MARKER,
            MatchTarget::Diagnostics,
        ))
    }
}

impl RuleSet {
    /// A table with no benign signatures.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify an exit the harness did not cause.
    pub fn classify(&self, exit: &EarlyExit<'_>) -> Classification {
        if exit.success {
            return Classification::Benign {
                label: CLEAN_EXIT_LABEL.to_string(),
            };
        }

        match self.rules.iter().find(|rule| rule.matches(exit)) {
            Some(rule) => Classification::Benign {
                label: rule.label.clone(),
            },
            None => Classification::Failure,
        }
    }
}
