//! BRANCHFLOW Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Step identifiers, history sequence numbers, run identifiers and the
//! logical clock used to schedule deferred navigation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use id::{RunId, SequenceId, StepId};
pub use time::{Duration, LogicalTime};
