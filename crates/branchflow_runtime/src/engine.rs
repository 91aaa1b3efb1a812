//! Flow engine.
//!
//! Owns the step graph, the history of the current run, the selection
//! memory and the replay scheduler. Every operation runs to completion
//! synchronously; the only deferred work is the auto-replay advance, which
//! fires when the host advances the logical clock.
//!
//! Deferred advances carry the engine generation and the sequence id of
//! the entry they continue. `start` and a confirmed rewind bump the
//! generation and drop pending advances; anything that still fires is
//! checked against the current history before it mutates.

use branchflow_core::{Duration, LogicalTime, RunId, SequenceId, StepId};
use branchflow_plan::{Step, StepGraph};

use crate::config::EngineConfig;
use crate::error::{FlowError, FlowResult};
use crate::history::{History, HistoryEntry};
use crate::memory::SelectionMemory;
use crate::prompt::Prompter;
use crate::scheduler::{ReplayScheduler, ScheduledAdvance};

/// A button of a rendered step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Option slot, zero-based
    Option(usize),
    /// The default-target button of a step without options
    Next,
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Option(slot) => write!(f, "option {}", slot + 1),
            Self::Next => write!(f, "next"),
        }
    }
}

/// Pending rewind awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewindRequest {
    /// Entry being changed
    pub index: usize,
    /// New choice label
    pub label: String,
    /// Step appended after the rewind
    pub target: StepId,
    /// Engine generation when the request was made
    pub generation: u64,
    /// Sequence id of the entry being changed
    pub sequence_id: SequenceId,
}

/// Result of [`FlowEngine::choose`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChooseOutcome {
    /// The current entry was resolved and a new entry appended
    Advanced {
        /// Appended step
        step_id: StepId,
        /// Sequence id of the appended entry
        sequence_id: SequenceId,
    },
    /// A past entry was chosen; nothing changes until the request is confirmed
    NeedsConfirmation(RewindRequest),
}

/// Result of [`FlowEngine::click`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Forward move from the current entry
    Advanced {
        /// Appended step
        step_id: StepId,
        /// Sequence id of the appended entry
        sequence_id: SequenceId,
    },
    /// Confirmed rewind
    Rewound {
        /// Appended step
        step_id: StepId,
        /// Sequence id of the appended entry
        sequence_id: SequenceId,
    },
    /// Rewind declined by the user
    Cancelled,
    /// The entry was auto-selected; the user was warned
    Locked,
}

/// Result of firing one deferred advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The advance was applied
    Applied {
        /// Appended step
        step_id: StepId,
        /// Sequence id of the appended entry
        sequence_id: SequenceId,
    },
    /// The advance no longer matched the history and was dropped
    Discarded {
        /// Replayed label
        label: String,
        /// Why it was dropped
        reason: &'static str,
    },
}

/// Navigation state machine over a step graph
#[derive(Debug)]
pub struct FlowEngine {
    /// Step graph, read-only
    graph: StepGraph,
    /// Configuration
    config: EngineConfig,
    /// Visited steps of the current run
    history: History,
    /// Remembered choices by option-set signature
    memory: SelectionMemory,
    /// Sequence id for the next pushed entry
    next_sequence: SequenceId,
    /// Bumped whenever pending advances become invalid
    generation: u64,
    /// Deferred auto-replay advances
    scheduler: ReplayScheduler,
    /// Logical clock
    clock: LogicalTime,
    /// Current run
    run_id: RunId,
}

impl FlowEngine {
    /// Create an engine and start a run at the configured start step.
    ///
    /// If the start step is missing the history stays empty; a later
    /// [`start`](Self::start) or [`jump`](Self::jump) can still begin a run.
    #[must_use]
    pub fn new(graph: StepGraph, config: EngineConfig) -> Self {
        let start = config.start_step.clone();
        let mut engine = Self {
            graph,
            config,
            history: History::new(),
            memory: SelectionMemory::new(),
            next_sequence: SequenceId::zero(),
            generation: 0,
            scheduler: ReplayScheduler::new(),
            clock: LogicalTime::zero(),
            run_id: RunId::new(),
        };
        if let Err(err) = engine.start(&start) {
            tracing::warn!(%err, "initial start failed; history is empty");
        }
        engine
    }

    /// Step graph
    #[must_use]
    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// History of the current run
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Selection memory of the current run
    #[must_use]
    pub fn memory(&self) -> &SelectionMemory {
        &self.memory
    }

    /// Current run id
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Logical clock
    #[must_use]
    pub fn clock(&self) -> LogicalTime {
        self.clock
    }

    /// Number of pending deferred advances
    #[must_use]
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    /// Due time of the next deferred advance
    #[must_use]
    pub fn next_due(&self) -> Option<LogicalTime> {
        self.scheduler.next_due()
    }

    /// Current entry and its step
    #[must_use]
    pub fn current(&self) -> Option<(&HistoryEntry, &Step)> {
        let entry = self.history.last()?;
        let step = self.graph.get(&entry.step_id)?;
        Some((entry, step))
    }

    /// Replace the history with a single entry at `step_id`.
    ///
    /// Clears the selection memory, resets the sequence counter and drops
    /// pending advances. A step missing from the graph leaves everything
    /// untouched.
    pub fn start(&mut self, step_id: &StepId) -> FlowResult<()> {
        if !self.graph.contains(step_id) {
            tracing::warn!(step = %step_id, "start step not found; history unchanged");
            return Err(FlowError::UnknownStep {
                id: step_id.clone(),
            });
        }

        let dropped = self.invalidate_pending();
        self.history = History::starting_at(step_id.clone(), SequenceId::zero());
        self.next_sequence = SequenceId::zero().next();
        self.memory.clear();
        self.run_id = RunId::new();

        tracing::info!(run = %self.run_id, step = %step_id, dropped, "run started");
        self.check_auto_replay();
        Ok(())
    }

    /// Start over at the configured start step
    pub fn restart(&mut self) -> FlowResult<()> {
        let start = self.config.start_step.clone();
        self.start(&start)
    }

    /// Start over at an externally supplied id.
    ///
    /// The id must match [`StepId::JUMP_PATTERN`] and name an existing step.
    pub fn jump(&mut self, raw: &str) -> FlowResult<()> {
        let step_id = StepId::parse(raw).map_err(|_| {
            tracing::warn!(raw, "jump target rejected");
            FlowError::InvalidStepId {
                raw: raw.to_string(),
            }
        })?;
        self.start(&step_id)
    }

    /// Resolve the entry at `index` with `label`, leading to `target`.
    ///
    /// On the current entry this moves forward immediately. On a past entry
    /// it returns a [`RewindRequest`] that must go through
    /// [`confirm_rewind`](Self::confirm_rewind).
    pub fn choose(
        &mut self,
        index: usize,
        label: &str,
        target: &StepId,
    ) -> FlowResult<ChooseOutcome> {
        let entry = self.entry(index)?;
        if entry.auto_selected {
            return Err(FlowError::AutoSelectedLocked { index });
        }
        let sequence_id = entry.sequence_id;

        if self.history.is_current(index) {
            let sequence_id = self.advance(label, target)?;
            return Ok(ChooseOutcome::Advanced {
                step_id: target.clone(),
                sequence_id,
            });
        }

        Ok(ChooseOutcome::NeedsConfirmation(RewindRequest {
            index,
            label: label.to_string(),
            target: target.clone(),
            generation: self.generation,
            sequence_id,
        }))
    }

    /// Apply a confirmed rewind.
    ///
    /// The new choice is written before truncation so the rebuilt memory
    /// reflects it. Fails without mutating anything if the request is stale
    /// or the target step is missing.
    pub fn confirm_rewind(&mut self, request: &RewindRequest) -> FlowResult<SequenceId> {
        let stale = FlowError::StaleRequest {
            index: request.index,
            sequence_id: request.sequence_id,
        };
        if request.generation != self.generation || self.history.is_current(request.index) {
            return Err(stale);
        }
        match self.history.get(request.index) {
            Some(entry) if entry.sequence_id == request.sequence_id => {}
            _ => return Err(stale),
        }
        if !self.graph.contains(&request.target) {
            tracing::warn!(step = %request.target, "rewind target not found; history unchanged");
            return Err(FlowError::UnknownStep {
                id: request.target.clone(),
            });
        }

        let dropped = self.invalidate_pending();
        if let Some(entry) = self.history.get_mut(request.index) {
            entry.choose(request.label.as_str(), false);
        }
        let discarded = self.history.len() - request.index - 1;
        self.history.truncate_after(request.index);
        self.next_sequence = self
            .history
            .last()
            .map_or(SequenceId::zero(), |entry| entry.sequence_id.next());
        self.memory.rebuild(&self.history, &self.graph);

        let sequence_id = self.push(request.target.clone());
        tracing::info!(
            index = request.index,
            label = %request.label,
            discarded,
            dropped,
            "history rewound"
        );
        self.check_auto_replay();
        Ok(sequence_id)
    }

    /// Dispatch a button click on the entry at `index`.
    ///
    /// Auto-selected entries only raise a warning. Past entries ask the
    /// prompter before rewinding.
    pub fn click<P>(
        &mut self,
        index: usize,
        button: Button,
        prompter: &mut P,
    ) -> FlowResult<ClickOutcome>
    where
        P: Prompter + ?Sized,
    {
        let (label, target, auto_selected) = {
            let entry = self.entry(index)?;
            let step = self
                .graph
                .get(&entry.step_id)
                .ok_or_else(|| FlowError::UnknownStep {
                    id: entry.step_id.clone(),
                })?;
            let resolved = match button {
                Button::Option(slot) => step
                    .options
                    .get(slot)
                    .map(|option| (option.text.clone(), option.next.clone())),
                Button::Next if step.options.is_empty() => step
                    .default_next
                    .clone()
                    .map(|next| (self.config.next_label.clone(), next)),
                Button::Next => None,
            };
            let (label, target) = resolved.ok_or_else(|| FlowError::NoSuchChoice {
                step: step.id.clone(),
                choice: button.to_string(),
            })?;
            (label, target, entry.auto_selected)
        };

        if auto_selected {
            prompter.warn_auto_selected(index);
            return Ok(ClickOutcome::Locked);
        }

        match self.choose(index, &label, &target)? {
            ChooseOutcome::Advanced {
                step_id,
                sequence_id,
            } => Ok(ClickOutcome::Advanced {
                step_id,
                sequence_id,
            }),
            ChooseOutcome::NeedsConfirmation(request) => {
                if !prompter.confirm_rewind(&request) {
                    tracing::debug!(index, "rewind declined");
                    return Ok(ClickOutcome::Cancelled);
                }
                let sequence_id = self.confirm_rewind(&request)?;
                Ok(ClickOutcome::Rewound {
                    step_id: request.target,
                    sequence_id,
                })
            }
        }
    }

    /// Advance the logical clock, firing every advance that falls due.
    ///
    /// Advances scheduled by a fired advance fire too if they fall due
    /// within the same window.
    pub fn advance_clock(&mut self, elapsed: Duration) -> Vec<ReplayOutcome> {
        let until = self.clock.after(elapsed);
        let outcomes = self.run_due(Some(until));
        self.clock = self.clock.max(until);
        outcomes
    }

    /// Fire pending advances until none remain, moving the clock to each
    /// due time. Stops after `settle_limit` advances since replay chains
    /// may cycle.
    pub fn settle(&mut self) -> Vec<ReplayOutcome> {
        let outcomes = self.run_due(None);
        if !self.scheduler.is_empty() {
            tracing::warn!(
                limit = self.config.settle_limit,
                pending = self.scheduler.len(),
                "settle limit reached"
            );
        }
        outcomes
    }

    /// Drop pending advances. The auto-selected entry keeps its choice.
    pub fn cancel_pending(&mut self) -> usize {
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            tracing::debug!(dropped, "pending advances cancelled");
        }
        dropped
    }

    fn entry(&self, index: usize) -> FlowResult<&HistoryEntry> {
        if self.history.is_empty() {
            return Err(FlowError::EmptyHistory);
        }
        self.history.get(index).ok_or(FlowError::IndexOutOfRange {
            index,
            len: self.history.len(),
        })
    }

    fn invalidate_pending(&mut self) -> usize {
        self.generation += 1;
        self.scheduler.cancel_all()
    }

    fn push(&mut self, step_id: StepId) -> SequenceId {
        let sequence_id = self.next_sequence;
        self.next_sequence = sequence_id.next();
        self.history.push(HistoryEntry::new(step_id, sequence_id));
        sequence_id
    }

    /// Forward move from the current entry
    fn advance(&mut self, label: &str, target: &StepId) -> FlowResult<SequenceId> {
        if !self.graph.contains(target) {
            tracing::warn!(step = %target, "target step not found; history unchanged");
            return Err(FlowError::UnknownStep { id: target.clone() });
        }
        let entry = self.history.last_mut().ok_or(FlowError::EmptyHistory)?;
        entry.choose(label, false);
        if let Some(step) = self.graph.get(&entry.step_id) {
            if step.option_by_text(label).is_some() {
                self.memory.remember(step, label);
            }
        }

        let sequence_id = self.push(target.clone());
        tracing::debug!(label, step = %target, %sequence_id, "advanced");
        self.check_auto_replay();
        Ok(sequence_id)
    }

    /// Auto-fill the current entry from memory and schedule its advance
    fn check_auto_replay(&mut self) -> Option<LogicalTime> {
        let entry = self.history.last_mut()?;
        if entry.is_chosen() {
            return None;
        }
        let step = self.graph.get(&entry.step_id)?;
        let label = self.memory.recall(step)?;
        let option = step.option_by_text(label)?;

        entry.choose(label, true);
        let due = self.clock.after(self.config.auto_replay_delay);
        self.scheduler.schedule(ScheduledAdvance {
            generation: self.generation,
            sequence_id: entry.sequence_id,
            label: label.to_string(),
            target: option.next.clone(),
            due,
        });
        tracing::info!(step = %entry.step_id, label, %due, "choice auto-selected");
        Some(due)
    }

    fn run_due(&mut self, until: Option<LogicalTime>) -> Vec<ReplayOutcome> {
        let mut outcomes = Vec::new();
        while outcomes.len() < self.config.settle_limit {
            let Some(due) = self.scheduler.next_due() else {
                break;
            };
            if until.is_some_and(|until| due > until) {
                break;
            }
            self.clock = self.clock.max(due);
            let Some(task) = self.scheduler.pop_due(self.clock) else {
                break;
            };
            outcomes.push(self.apply_scheduled(task));
        }
        outcomes
    }

    fn apply_scheduled(&mut self, task: ScheduledAdvance) -> ReplayOutcome {
        let discard = |reason: &'static str| {
            tracing::debug!(label = %task.label, reason, "deferred advance discarded");
            ReplayOutcome::Discarded {
                label: task.label.clone(),
                reason,
            }
        };

        if task.generation != self.generation {
            return discard("generation changed");
        }
        let matches = self.history.last().is_some_and(|entry| {
            entry.sequence_id == task.sequence_id
                && entry.auto_selected
                && entry.chosen_option.as_deref() == Some(task.label.as_str())
        });
        if !matches {
            return discard("current entry changed");
        }
        if !self.graph.contains(&task.target) {
            return discard("target step not found");
        }

        let sequence_id = self.push(task.target.clone());
        tracing::info!(step = %task.target, %sequence_id, "auto-selected choice applied");
        self.check_auto_replay();
        ReplayOutcome::Applied {
            step_id: task.target,
            sequence_id,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::prompt::AutoConfirm;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Option { index: usize, slot: usize },
        Next { index: usize },
        Tick(u64),
        Settle,
        Jump(&'static str),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8, 0usize..3).prop_map(|(index, slot)| Op::Option { index, slot }),
            (0usize..8).prop_map(|index| Op::Next { index }),
            (0u64..4000).prop_map(Op::Tick),
            Just(Op::Settle),
            prop_oneof![Just("1"), Just("3"), Just("9")].prop_map(Op::Jump),
        ]
    }

    /// Shared A/B signatures, a back edge, a non-replayable step and a
    /// link to a missing step
    fn graph() -> StepGraph {
        vec![
            Step::new("1", "one").with_option("A", "2").with_option("B", "3"),
            Step::new("2", "two").with_option("A", "4").with_option("B", "1"),
            Step::new("3", "three").with_default_next("2"),
            Step::new("4", "four")
                .with_option("B", "3")
                .with_option("A", "5")
                .with_non_auto_select(true),
            Step::new("5", "five").with_option("X", "missing"),
        ]
        .into_iter()
        .collect()
    }

    proptest! {
        #[test]
        fn prop_history_stays_consistent(ops in proptest::collection::vec(op(), 0..48)) {
            let config = EngineConfig::default().with_settle_limit(16);
            let mut engine = FlowEngine::new(graph(), config);
            let mut prompter = AutoConfirm::default();

            for op in ops {
                let _ = match op {
                    Op::Option { index, slot } => engine
                        .click(index, Button::Option(slot), &mut prompter)
                        .map(|_| ()),
                    Op::Next { index } => {
                        engine.click(index, Button::Next, &mut prompter).map(|_| ())
                    }
                    Op::Tick(ms) => {
                        engine.advance_clock(Duration::from_millis(ms));
                        Ok(())
                    }
                    Op::Settle => {
                        engine.settle();
                        Ok(())
                    }
                    Op::Jump(id) => engine.jump(id),
                };

                let history = engine.history();
                prop_assert!(!history.is_empty());
                for pair in history.entries().windows(2) {
                    prop_assert!(pair[0].sequence_id < pair[1].sequence_id);
                    prop_assert!(pair[0].is_chosen());
                }
                for entry in history.iter() {
                    prop_assert!(engine.graph().contains(&entry.step_id));
                }
                prop_assert!(engine.pending() <= 1);
            }
        }
    }
}
