//! BRANCHFLOW command-line support.
//!
//! Configuration loading, sessions over a loaded flow, the walk/play
//! command language, the interactive loop and terminal output. The
//! `branchflow` binary wires these to subcommands.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod output;
pub mod play;
pub mod prompt;
pub mod script;
pub mod session;

pub use config::BranchflowConfig;
pub use error::{CliError, CliResult};
pub use prompt::{LinePrompter, TermPrompter};
pub use script::{Applied, Command};
pub use session::Session;
