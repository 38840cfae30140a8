//! Spawning one server and supervising it through the grace window.
//!
//! Two tasks cooperate per process:
//! - the observer owns the child and waits for whichever comes first, the
//!   child exiting on its own or a kill request;
//! - the supervisor (the caller of [`ServerProcess::supervise`]) sleeps for
//!   the grace window, requests the kill, and joins the observer.
//!
//! Both the kill request and the captured stderr travel over one-shot
//! channels, so a late publish after the supervisor has moved on is dropped
//! instead of touching freed state.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use corecheck_core::{Classification, EarlyExit, RuleSet, ValidationOutcome};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::command::ServerCommand;
use crate::error::{LaunchError, LaunchResult};

/// How long the supervisor waits for the observer after requesting the kill.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for stderr to reach EOF after an early exit.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of supervising one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supervised {
    pub outcome: ValidationOutcome,

    /// Spawn to reap.
    pub elapsed: Duration,

    /// Whether the kill request reached a still-running observer.
    pub killed_by_harness: bool,
}

/// What the observer saw.
enum Watch {
    Exited(std::io::Result<ExitStatus>),
    Terminated,
}

/// A running server instance for a single snippet.
pub struct ServerProcess {
    child: Child,
    stderr: ChildStderr,
    pid: Option<u32>,
    spawned_at: Instant,
}

impl ServerProcess {
    /// Start `command` against the configuration at `config_path`.
    ///
    /// With `quiet` the server's stdout is discarded, otherwise it is
    /// inherited. Stderr is always piped for classification. The child is
    /// killed if this handle is dropped.
    pub fn spawn(command: &ServerCommand, config_path: &Path, quiet: bool) -> LaunchResult<Self> {
        let stdout = if quiet { Stdio::null() } else { Stdio::inherit() };

        let mut child = Command::new(&command.program)
            .args(command.args(config_path))
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let Some(stderr) = child.stderr.take() else {
            let _ = child.start_kill();
            return Err(LaunchError::MissingStderr);
        };

        let pid = child.id();
        debug!(pid = ?pid, program = %command.program.display(), "server spawned");

        Ok(Self {
            child,
            stderr,
            pid,
            spawned_at: Instant::now(),
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Let the process run for `grace`, then terminate it and classify what
    /// happened.
    pub async fn supervise(
        self,
        grace: Duration,
        stderr_limit: usize,
        rules: &RuleSet,
    ) -> Supervised {
        let ServerProcess {
            mut child,
            stderr,
            pid,
            spawned_at,
        } = self;

        let (diagnostics_rx, capture) = spawn_capture(stderr, stderr_limit);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        let mut observer: JoinHandle<Watch> = tokio::spawn(async move {
            // An exit that already happened wins over a kill request.
            tokio::select! {
                biased;
                status = child.wait() => Watch::Exited(status),
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        debug!(error = %e, "kill after grace window failed");
                    }
                    Watch::Terminated
                }
            }
        });

        tokio::time::sleep(grace).await;

        // The observer is gone if the process already exited; that is fine.
        let killed_by_harness = kill_tx.send(()).is_ok();

        let watch = match tokio::time::timeout(REAP_TIMEOUT, &mut observer).await {
            Ok(Ok(watch)) => Some(watch),
            Ok(Err(join_err)) => {
                warn!(pid = ?pid, error = %join_err, "exit observer task failed");
                None
            }
            Err(_) => {
                warn!(pid = ?pid, "process not reaped after kill; aborting observer");
                observer.abort();
                None
            }
        };

        let outcome = match watch {
            Some(Watch::Terminated) => ValidationOutcome::Survived,
            Some(Watch::Exited(status)) => {
                let captured = tokio::time::timeout(CAPTURE_TIMEOUT, diagnostics_rx).await;
                let diagnostics = match captured {
                    Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                    _ => String::new(),
                };
                classify_exit(status, diagnostics, rules)
            }
            None => ValidationOutcome::Crashed {
                status: "unknown (observer lost)".to_string(),
                stderr: String::new(),
            },
        };

        capture.abort();

        Supervised {
            outcome,
            elapsed: spawned_at.elapsed(),
            killed_by_harness,
        }
    }
}

/// Read up to `limit` bytes of `reader`, publish them, then keep draining so
/// a chatty child never blocks on a full pipe.
fn spawn_capture<R>(
    mut reader: R,
    limit: usize,
) -> (oneshot::Receiver<Vec<u8>>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let mut buf = Vec::with_capacity(limit);
        if let Err(e) = (&mut reader).take(limit as u64).read_to_end(&mut buf).await {
            debug!(error = %e, "stderr read failed");
        }
        let _ = tx.send(buf);
        let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
    });
    (rx, handle)
}

fn classify_exit(
    status: std::io::Result<ExitStatus>,
    diagnostics: String,
    rules: &RuleSet,
) -> ValidationOutcome {
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            return ValidationOutcome::Crashed {
                status: format!("wait failed: {}", e),
                stderr: diagnostics,
            }
        }
    };

    let rendered = status.to_string();
    let exit = EarlyExit {
        success: status.success(),
        status: &rendered,
        diagnostics: &diagnostics,
    };

    match rules.classify(&exit) {
        Classification::Benign { label } => ValidationOutcome::BenignExit {
            label,
            status: rendered,
        },
        Classification::Failure => ValidationOutcome::Crashed {
            status: rendered,
            stderr: diagnostics,
        },
    }
}
