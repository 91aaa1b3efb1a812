//! Navigation errors.
//!
//! None of these is fatal: every failing operation leaves the engine
//! exactly as it was.

use branchflow_core::{SequenceId, StepId};

/// Navigation result type
pub type FlowResult<T> = Result<T, FlowError>;

/// Navigation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// Target step is not in the graph
    #[error("Step not found: {id}")]
    UnknownStep {
        /// Requested step
        id: StepId,
    },

    /// Externally supplied id failed the pattern check
    #[error("Invalid step id: {raw:?}")]
    InvalidStepId {
        /// Rejected input
        raw: String,
    },

    /// History index out of range
    #[error("History index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// History length
        len: usize,
    },

    /// The entry was filled in by auto-replay and only a rewind may change it
    #[error("Entry {index} was auto-selected; rewind to change it")]
    AutoSelectedLocked {
        /// Entry index
        index: usize,
    },

    /// A rewind confirmation arrived after the history moved on
    #[error("Stale rewind request for entry {index} (sequence {sequence_id})")]
    StaleRequest {
        /// Entry index of the request
        index: usize,
        /// Sequence id captured by the request
        sequence_id: SequenceId,
    },

    /// The step offers no such button
    #[error("Step {step} has no {choice} button")]
    NoSuchChoice {
        /// Step of the entry
        step: StepId,
        /// Requested button
        choice: String,
    },

    /// No run has been started
    #[error("History is empty")]
    EmptyHistory,
}
