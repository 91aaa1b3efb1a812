//! Selection memory.
//!
//! Remembers which option was picked for a given set of offered options,
//! so a later step offering the same set can be answered automatically.

use branchflow_plan::{Step, StepGraph, StepOption};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::history::History;

/// Identity of an option set: texts in UTF-16 code unit order joined by `||`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Separator between option texts
    pub const SEPARATOR: &'static str = "||";

    /// Signature of an option list. Independent of option order.
    #[must_use]
    pub fn of(options: &[StepOption]) -> Self {
        let mut texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
        texts.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
        Self(texts.join(Self::SEPARATOR))
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from option-set signature to the remembered choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMemory {
    choices: IndexMap<Signature, String>,
}

impl SelectionMemory {
    /// Create empty memory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a choice made at a step. Ignored unless the step is
    /// eligible for replay.
    pub fn remember(&mut self, step: &Step, label: &str) -> bool {
        if !step.is_replayable() {
            return false;
        }
        self.choices
            .insert(Signature::of(&step.options), label.to_string());
        true
    }

    /// Remembered choice for a step's option set
    #[must_use]
    pub fn recall(&self, step: &Step) -> Option<&str> {
        if !step.is_replayable() {
            return None;
        }
        self.choices
            .get(&Signature::of(&step.options))
            .map(String::as_str)
    }

    /// Remembered choice for a signature
    #[must_use]
    pub fn get(&self, signature: &Signature) -> Option<&str> {
        self.choices.get(signature).map(String::as_str)
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.choices.clear();
    }

    /// Recompute from the choices recorded in a history. Later entries
    /// overwrite earlier ones with the same signature.
    pub fn rebuild(&mut self, history: &History, graph: &StepGraph) {
        self.choices.clear();
        for entry in history.iter() {
            let Some(label) = entry.chosen_option.as_deref() else {
                continue;
            };
            if let Some(step) = graph.get(&entry.step_id) {
                self.remember(step, label);
            }
        }
    }

    /// Number of remembered signatures
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Iterate remembered choices
    pub fn iter(&self) -> impl Iterator<Item = (&Signature, &str)> {
        self.choices.iter().map(|(sig, label)| (sig, label.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use branchflow_core::{SequenceId, StepId};

    fn ab_step(id: &str) -> Step {
        Step::new(id, "t").with_option("A", "2").with_option("B", "3")
    }

    #[test]
    fn test_signature_order_independent() {
        let forward = ab_step("1");
        let reversed = Step::new("9", "t").with_option("B", "x").with_option("A", "y");
        assert_eq!(Signature::of(&forward.options), Signature::of(&reversed.options));
        assert_eq!(Signature::of(&forward.options).as_str(), "A||B");
    }

    #[test]
    fn test_signature_uses_utf16_order() {
        // U+FF21 sorts after U+1F600 by code point but before it in UTF-16
        let step = Step::new("1", "t")
            .with_option("\u{1F600}", "2")
            .with_option("\u{FF21}", "3");
        assert_eq!(
            Signature::of(&step.options).as_str(),
            "\u{1F600}||\u{FF21}"
        );
    }

    #[test]
    fn test_remember_and_recall_across_steps() {
        let mut memory = SelectionMemory::new();
        assert!(memory.remember(&ab_step("1"), "A"));
        assert_eq!(memory.recall(&ab_step("5")), Some("A"));
    }

    #[test]
    fn test_non_auto_select_not_remembered() {
        let mut memory = SelectionMemory::new();
        let step = ab_step("1").with_non_auto_select(true);
        assert!(!memory.remember(&step, "A"));
        assert!(memory.is_empty());
        memory.remember(&ab_step("2"), "B");
        assert_eq!(memory.recall(&step), None);
    }

    #[test]
    fn test_rebuild_last_wins() {
        let graph: StepGraph = vec![ab_step("1"), ab_step("2"), Step::new("3", "end")]
            .into_iter()
            .collect();

        let mut history = History::new();
        let mut first = HistoryEntry::new(StepId::new("1"), SequenceId::from_raw(0));
        first.choose("A", false);
        let mut second = HistoryEntry::new(StepId::new("2"), SequenceId::from_raw(1));
        second.choose("B", false);
        history.push(first);
        history.push(second);
        history.push(HistoryEntry::new(StepId::new("3"), SequenceId::from_raw(2)));

        let mut memory = SelectionMemory::new();
        memory.remember(&Step::new("x", "t").with_option("Z", "1"), "Z");
        memory.rebuild(&history, &graph);

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.recall(&ab_step("9")), Some("B"));
    }
}
