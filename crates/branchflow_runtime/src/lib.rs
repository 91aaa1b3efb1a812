//! BRANCHFLOW Runtime
//!
//! Navigation state machine over a step graph: a linear history with
//! rewindable branch points, a memory of choices keyed by the set of
//! options offered, and deferred auto-replay of remembered choices.
//!
//! The engine is single-owner and synchronous. The only deferred work is
//! the auto-replay advance, scheduled on a logical clock the host drives.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod prompt;
pub mod scheduler;
pub mod view;

pub use config::EngineConfig;
pub use engine::{Button, ChooseOutcome, ClickOutcome, FlowEngine, ReplayOutcome, RewindRequest};
pub use error::{FlowError, FlowResult};
pub use history::{History, HistoryEntry};
pub use memory::{SelectionMemory, Signature};
pub use prompt::{AutoConfirm, Decline, Prompter};
pub use scheduler::{ReplayScheduler, ScheduledAdvance};
pub use view::{
    AUTO_SELECT_NOTICE, ButtonState, ButtonView, ChecklistItem, Position, Presenter, SectionView,
};
