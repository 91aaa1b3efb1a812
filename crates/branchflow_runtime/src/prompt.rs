//! Prompt collaborators.
//!
//! The engine never decides on its own whether a rewind may proceed; a
//! [`Prompter`] supplied by the host answers for the user.

use crate::engine::RewindRequest;

/// User-facing prompts raised while dispatching a button click
pub trait Prompter {
    /// Ask whether a past choice may be replaced, discarding what follows it
    fn confirm_rewind(&mut self, request: &RewindRequest) -> bool;

    /// Tell the user that an auto-selected entry cannot be changed directly
    fn warn_auto_selected(&mut self, index: usize);
}

/// Accepts every rewind and counts warnings
#[derive(Debug, Clone, Default)]
pub struct AutoConfirm {
    /// Number of auto-selection warnings raised
    pub warnings: usize,
}

impl Prompter for AutoConfirm {
    fn confirm_rewind(&mut self, _request: &RewindRequest) -> bool {
        true
    }

    fn warn_auto_selected(&mut self, _index: usize) {
        self.warnings += 1;
    }
}

/// Declines every rewind and counts warnings
#[derive(Debug, Clone, Default)]
pub struct Decline {
    /// Number of auto-selection warnings raised
    pub warnings: usize,
}

impl Prompter for Decline {
    fn confirm_rewind(&mut self, _request: &RewindRequest) -> bool {
        false
    }

    fn warn_auto_selected(&mut self, _index: usize) {
        self.warnings += 1;
    }
}
