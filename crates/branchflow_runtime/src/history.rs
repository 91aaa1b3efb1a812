//! Navigation history.
//!
//! An ordered list of visited steps. The last entry is the current step;
//! every earlier entry records the choice that led out of it. Sequence ids
//! never repeat within a run and identify the DOM-facing elements of an
//! entry (checklist ids, for instance).

use branchflow_core::{SequenceId, StepId};
use serde::{Deserialize, Serialize};

/// One visited step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Visited step
    pub step_id: StepId,
    /// Label of the choice that left this step, if any
    pub chosen_option: Option<String>,
    /// Monotonic id within the run
    pub sequence_id: SequenceId,
    /// Whether the choice was filled in by auto-replay
    pub auto_selected: bool,
}

impl HistoryEntry {
    /// Fresh entry with no choice yet
    #[must_use]
    pub fn new(step_id: StepId, sequence_id: SequenceId) -> Self {
        Self {
            step_id,
            chosen_option: None,
            sequence_id,
            auto_selected: false,
        }
    }

    /// Record a choice
    pub fn choose(&mut self, label: impl Into<String>, auto_selected: bool) {
        self.chosen_option = Some(label.into());
        self.auto_selected = auto_selected;
    }

    /// Whether the entry carries a choice
    #[must_use]
    pub fn is_chosen(&self) -> bool {
        self.chosen_option.is_some()
    }
}

/// Visited steps of the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history holding a single entry
    #[must_use]
    pub fn starting_at(step_id: StepId, sequence_id: SequenceId) -> Self {
        Self {
            entries: vec![HistoryEntry::new(step_id, sequence_id)],
        }
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at an index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Mutable entry at an index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut HistoryEntry> {
        self.entries.get_mut(index)
    }

    /// Current entry
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Mutable current entry
    pub fn last_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.last_mut()
    }

    /// Whether `index` addresses the current entry
    #[must_use]
    pub fn is_current(&self, index: usize) -> bool {
        index + 1 == self.entries.len()
    }

    /// Append a new current entry
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Drop every entry after `index`, keeping `index` itself
    pub fn truncate_after(&mut self, index: usize) {
        self.entries.truncate(index.saturating_add(1));
    }

    /// Iterate entries
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(ids: &[&str]) -> History {
        let mut history = History::new();
        for (seq, id) in ids.iter().enumerate() {
            history.push(HistoryEntry::new(
                StepId::new(*id),
                SequenceId::from_raw(seq as u64),
            ));
        }
        history
    }

    #[test]
    fn test_truncate_after_keeps_index() {
        let mut history = history_of(&["1", "2", "3", "4"]);
        history.truncate_after(1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().step_id.as_str(), "2");
    }

    #[test]
    fn test_truncate_after_last_is_noop() {
        let mut history = history_of(&["1", "2"]);
        history.truncate_after(1);
        assert_eq!(history.len(), 2);
        history.truncate_after(10);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_is_current() {
        let history = history_of(&["1", "2"]);
        assert!(!history.is_current(0));
        assert!(history.is_current(1));
        assert!(!history.is_current(2));
    }

    #[test]
    fn test_choose_marks_entry() {
        let mut entry = HistoryEntry::new(StepId::new("1"), SequenceId::zero());
        assert!(!entry.is_chosen());
        entry.choose("A", true);
        assert_eq!(entry.chosen_option.as_deref(), Some("A"));
        assert!(entry.auto_selected);
    }
}
