//! How the server under test is invoked.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default server binary, relative to the working directory.
pub const DEFAULT_PROGRAM: &str = "./coredns";

/// Flag that names the configuration file.
pub const DEFAULT_CONFIG_FLAG: &str = "-conf";

/// Flag that overrides the listening port.
pub const DEFAULT_PORT_FLAG: &str = "-dns.port";

/// Port value asking the server for an ephemeral port so nothing real is bound.
pub const DEFAULT_PORT: &str = "0";

/// Command line used to start the server for one snippet.
///
/// The final argument vector is
/// `program [wrapper_args...] <config_flag> <config path> <port_flag> <port>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerCommand {
    /// Executable to run.
    pub program: PathBuf,

    /// Arguments placed before the configuration flags, for running the
    /// server under a wrapper (`sh -c`, `valgrind`, ...).
    #[serde(default)]
    pub wrapper_args: Vec<OsString>,

    pub config_flag: String,

    pub port_flag: String,

    pub port: String,
}

impl Default for ServerCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ServerCommand {
    /// Invoke `program` with the standard flags.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            wrapper_args: Vec::new(),
            config_flag: DEFAULT_CONFIG_FLAG.to_string(),
            port_flag: DEFAULT_PORT_FLAG.to_string(),
            port: DEFAULT_PORT.to_string(),
        }
    }

    /// Add an argument ahead of the configuration flags.
    pub fn wrapper_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.wrapper_args.push(arg.into());
        self
    }

    /// Override the port handed to the server.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Arguments for a run against the configuration at `config_path`.
    pub fn args(&self, config_path: &Path) -> Vec<OsString> {
        let mut args = self.wrapper_args.clone();
        args.push(OsString::from(&self.config_flag));
        args.push(config_path.as_os_str().to_os_string());
        args.push(OsString::from(&self.port_flag));
        args.push(OsString::from(&self.port));
        args
    }
}
