//! Deferred auto-replay advances.
//!
//! Ready queue ordered by due time, then by scheduling order, so that
//! firing is deterministic for a given sequence of clock advances.

use std::collections::BTreeMap;

use branchflow_core::{LogicalTime, SequenceId, StepId};
use serde::{Deserialize, Serialize};

/// A pending advance produced by auto-replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAdvance {
    /// Engine generation at scheduling time
    pub generation: u64,
    /// Sequence id of the auto-selected entry
    pub sequence_id: SequenceId,
    /// Replayed label
    pub label: String,
    /// Step to append
    pub target: StepId,
    /// When the advance fires
    pub due: LogicalTime,
}

/// Ready queue of deferred advances
#[derive(Debug, Clone, Default)]
pub struct ReplayScheduler {
    pending: BTreeMap<(LogicalTime, u64), ScheduledAdvance>,
    next_ticket: u64,
}

impl ReplayScheduler {
    /// Create an empty scheduler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an advance
    pub fn schedule(&mut self, task: ScheduledAdvance) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert((task.due, ticket), task);
    }

    /// Remove and return the earliest advance due at or before `now`
    pub fn pop_due(&mut self, now: LogicalTime) -> Option<ScheduledAdvance> {
        let key = *self.pending.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.pending.remove(&key)
    }

    /// Due time of the earliest pending advance
    #[must_use]
    pub fn next_due(&self) -> Option<LogicalTime> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Drop every pending advance, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Number of pending advances
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(label: &str, due: u64) -> ScheduledAdvance {
        ScheduledAdvance {
            generation: 1,
            sequence_id: SequenceId::zero(),
            label: label.to_string(),
            target: StepId::new("2"),
            due: LogicalTime::from_millis(due),
        }
    }

    #[test]
    fn test_pop_due_respects_time() {
        let mut scheduler = ReplayScheduler::new();
        scheduler.schedule(task("a", 100));

        assert!(scheduler.pop_due(LogicalTime::from_millis(99)).is_none());
        let fired = scheduler.pop_due(LogicalTime::from_millis(100)).unwrap();
        assert_eq!(fired.label, "a");
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_same_due_fires_in_schedule_order() {
        let mut scheduler = ReplayScheduler::new();
        scheduler.schedule(task("first", 50));
        scheduler.schedule(task("second", 50));
        scheduler.schedule(task("early", 10));

        let now = LogicalTime::from_millis(50);
        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(now))
            .map(|t| t.label)
            .collect();
        assert_eq!(order, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = ReplayScheduler::new();
        scheduler.schedule(task("a", 1));
        scheduler.schedule(task("b", 2));
        assert_eq!(scheduler.next_due(), Some(LogicalTime::from_millis(1)));
        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.next_due(), None);
    }
}
