//! corecheck runner - starts the server for every documented snippet
//!
//! Provides the lifecycle validator that:
//! - Writes each snippet to a scratch configuration file
//! - Spawns the server on an ephemeral port and waits out a grace window
//! - Terminates the server and classifies any early exit
//! - Aggregates outcomes per document and gates the run

pub mod command;
pub mod config;
pub mod error;
pub mod gate;
pub mod harness;
pub mod obs;
pub mod process;
pub mod validator;

// Re-export key types
pub use command::ServerCommand;
pub use config::{default_scratch_path, ValidatorConfig, DEFAULT_GRACE_MS, DEFAULT_STDERR_LIMIT};
pub use error::{LaunchError, LaunchResult};
pub use gate::{GateVerdict, RunGate};
pub use harness::{Harness, HarnessHandler, SilentHandler};
pub use process::{ServerProcess, Supervised};
pub use validator::{ProcessValidator, SnippetValidator};
