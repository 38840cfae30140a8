//! Integration tests for the lifecycle validator against real processes.
//!
//! `/bin/sh -c <script>` stands in for the server. The harness appends
//! `-conf <path> -dns.port 0`, which the script sees as `$1`..`$4`.
#![cfg(unix)]

use corecheck_core::{ConfigSnippet, FenceStyle, ValidationOutcome};
use corecheck_runner::{
    Harness, ProcessValidator, RunGate, ServerCommand, SnippetValidator, ValidatorConfig,
};
use std::path::Path;
use std::sync::Arc;

const GRACE_MS: u64 = 300;

/// Upper bound on spawn-to-reap. The kill is requested at `GRACE_MS`, so
/// anything past this margin means the kill path stalled.
const REAP_BOUND_MS: u64 = GRACE_MS + 500;

const LONG_RUNNING: &str = "exec sleep 30";

fn sh_validator(script: &str, scratch: &Path) -> ProcessValidator {
    let command = ServerCommand::new("/bin/sh")
        .wrapper_arg("-c")
        .wrapper_arg(script)
        .wrapper_arg("coredns");
    let mut config = ValidatorConfig::new(command);
    config.grace_ms = GRACE_MS;
    config.scratch_path = scratch.to_path_buf();
    ProcessValidator::new(config)
}

fn snippet(body: &str) -> ConfigSnippet {
    ConfigSnippet::new(0, 1, FenceStyle::Tilde, body)
}

/// Test: a server still running after the grace window is killed and passes
#[tokio::test]
async fn test_long_running_server_survives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let validator = sh_validator(LONG_RUNNING, &dir.path().join("corefile"));

    let result = validator.validate(&snippet(". { whoami }\n")).await;

    assert_eq!(result.outcome, ValidationOutcome::Survived);
    assert!(result.passed());
    assert!(result.elapsed_ms >= GRACE_MS, "killed before the grace window");
    assert!(result.elapsed_ms < REAP_BOUND_MS, "took {}ms", result.elapsed_ms);
}

/// Test: the server is invoked with the config flag, scratch path and inert port
#[tokio::test]
async fn test_server_receives_config_and_port_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = r#"[ "$1" = "-conf" ] && [ "$3" = "-dns.port" ] && [ "$4" = "0" ] || exit 3
grep -q whoami "$2" || exit 4
exec sleep 30"#;
    let validator = sh_validator(script, &dir.path().join("corefile"));

    let result = validator.validate(&snippet(". { whoami }\n")).await;

    assert_eq!(result.outcome, ValidationOutcome::Survived);
}

/// Test: an early non-zero exit is a real failure carrying stderr
#[tokio::test]
async fn test_early_crash_is_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = "echo \"Error during parsing: Unknown directive 'bogus'\" >&2; exit 1";
    let validator = sh_validator(script, &dir.path().join("corefile"));

    let result = validator.validate(&snippet(". { bogus }\n")).await;

    match &result.outcome {
        ValidationOutcome::Crashed { status, stderr } => {
            assert!(status.contains('1'), "status was {}", status);
            assert!(stderr.contains("Unknown directive 'bogus'"));
        }
        other => panic!("expected Crashed, got {:?}", other),
    }
    assert!(!result.passed());
    assert!(result.elapsed_ms < REAP_BOUND_MS);
}

/// Test: the kubernetes environment marker excuses a non-zero exit
#[tokio::test]
async fn test_kubernetes_marker_is_benign() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = "echo 'plugin/kubernetes: KUBERNETES_SERVICE_HOST and KUBERNETES_SERVICE_PORT must be defined' >&2; exit 1";
    let validator = sh_validator(script, &dir.path().join("corefile"));

    let result = validator
        .validate(&snippet(". { kubernetes cluster.local }\n"))
        .await;

    assert_eq!(
        result.outcome,
        ValidationOutcome::BenignExit {
            label: "kubernetes-environment".to_string(),
            status: "exit status: 1".to_string(),
        }
    );
    assert!(result.passed());
}

/// Test: a zero exit inside the grace window is not a failure
#[tokio::test]
async fn test_clean_early_exit_is_benign() {
    let dir = tempfile::tempdir().expect("tempdir");
    let validator = sh_validator("exit 0", &dir.path().join("corefile"));

    let result = validator.validate(&snippet(". { whoami }\n")).await;

    assert!(matches!(
        result.outcome,
        ValidationOutcome::BenignExit { ref label, .. } if label == "clean-exit"
    ));
}

/// Test: a server flooding stderr is drained and still counts as started
#[tokio::test]
async fn test_chatty_stderr_does_not_block_server() {
    let dir = tempfile::tempdir().expect("tempdir");
    let validator = sh_validator("exec yes corecheck >&2", &dir.path().join("corefile"));

    let result = validator.validate(&snippet(". { log }\n")).await;

    assert_eq!(result.outcome, ValidationOutcome::Survived);
    assert!(result.elapsed_ms < REAP_BOUND_MS);
}

/// Test: a missing executable fails to start and counts exactly once
#[tokio::test]
async fn test_missing_executable_counts_one_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = ValidatorConfig::new(ServerCommand::new(dir.path().join("no-such-coredns")));
    config.grace_ms = GRACE_MS;
    config.scratch_path = dir.path().join("corefile");
    let harness = Harness::new(Arc::new(ProcessValidator::new(config)));

    let snippets = corecheck_core::extract_snippets("~~~ corefile\n. { whoami }\n~~~\n");
    let report = harness
        .check_snippets(Path::new("README.md"), snippets)
        .await;

    assert_eq!(report.total, 1);
    assert_eq!(report.failed, 1);
    assert!(matches!(
        report.results[0].outcome,
        ValidationOutcome::FailedToStart { .. }
    ));
}

/// Test: one valid and one broken example in a document gives total=2, failed=1
#[tokio::test]
async fn test_end_to_end_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).expect("mkdir");
    std::fs::write(
        docs.join("README.md"),
        "# whoami\n\n~~~ corefile\n. {\n    whoami\n}\n~~~\n\nBroken:\n\n``` corefile\n. {\n    nonexistentplugin\n}\n```\n",
    )
    .expect("write doc");
    std::fs::write(docs.join("notes.txt"), "~~~ corefile\n. { bogus }\n~~~\n").expect("write txt");

    let script = r#"if grep -q nonexistentplugin "$2"; then
    echo "/etc/coredns/Corefile:3 - Error during parsing: Unknown directive 'nonexistentplugin'" >&2
    exit 1
fi
exec sleep 30"#;
    let harness = Harness::new(Arc::new(sh_validator(script, &dir.path().join("corefile"))));

    let summary = harness.check_directory(&docs).await.expect("run");

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.total, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[0].outcome, ValidationOutcome::Survived);
    assert_eq!(report.results[1].line, 11);

    let verdict = RunGate::evaluate(&summary);
    assert!(!verdict.passed);
    assert_eq!(verdict.violations.len(), 1);
    assert!(verdict.violations[0].contains("README.md:11"));
}
