//! CLI errors.

use std::path::PathBuf;

use branchflow_runtime::FlowError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read
    #[error("failed to read {path}")]
    Read {
        /// File path
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`BranchflowConfig`](crate::BranchflowConfig)
    #[error("invalid configuration in {path}")]
    Config {
        /// File path
        path: PathBuf,
        /// Cause
        #[source]
        source: serde_json::Error,
    },

    /// Reading commands or writing output failed
    #[error("terminal I/O failed")]
    Io(#[from] std::io::Error),

    /// A command could not be parsed
    #[error("invalid command {input:?}: {reason}")]
    InvalidCommand {
        /// Raw command
        input: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The step at an entry offers no button with this label
    #[error("no choice {label:?} at history index {index}")]
    UnknownChoice {
        /// History index
        index: usize,
        /// Requested label
        label: String,
    },

    /// Navigation failed
    #[error(transparent)]
    Flow(#[from] FlowError),
}
