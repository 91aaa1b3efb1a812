//! Step graph of a flow.
//!
//! Built once from a validated dataset and immutable afterwards. Links
//! between steps are plain [`StepId`]s; a link to an undeclared step is
//! allowed (the dataset may be under construction) and simply cannot be
//! followed at runtime.

use branchflow_core::{CoreError, CoreResult, StepId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body text of a step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanations {
    /// First paragraph
    pub exp1: String,
    /// Checklist source, one item per line
    pub nota: String,
    /// Second paragraph
    pub exp2: String,
    /// Third paragraph
    pub exp3: String,
}

/// One outgoing choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    /// Button text
    pub text: String,
    /// Target step
    pub next: StepId,
}

impl StepOption {
    /// Create an option
    #[must_use]
    pub fn new(text: impl Into<String>, next: impl Into<StepId>) -> Self {
        Self {
            text: text.into(),
            next: next.into(),
        }
    }
}

/// A node of the flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique id
    pub id: StepId,
    /// Title
    pub title: String,
    /// Body text
    pub explanations: Explanations,
    /// Choices, at most five, in column order
    pub options: Vec<StepOption>,
    /// Target used only when there are no options
    pub default_next: Option<StepId>,
    /// Opt-out from auto-replay
    pub non_auto_select: bool,
}

impl Step {
    /// Create a terminal step with a title
    #[must_use]
    pub fn new(id: impl Into<StepId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            explanations: Explanations::default(),
            options: Vec::new(),
            default_next: None,
            non_auto_select: false,
        }
    }

    /// Add an option
    #[must_use]
    pub fn with_option(mut self, text: impl Into<String>, next: impl Into<StepId>) -> Self {
        self.options.push(StepOption::new(text, next));
        self
    }

    /// Set the default target
    #[must_use]
    pub fn with_default_next(mut self, next: impl Into<StepId>) -> Self {
        self.default_next = Some(next.into());
        self
    }

    /// Opt out of auto-replay
    #[must_use]
    pub fn with_non_auto_select(mut self, non_auto_select: bool) -> Self {
        self.non_auto_select = non_auto_select;
        self
    }

    /// Set the body text
    #[must_use]
    pub fn with_explanations(mut self, explanations: Explanations) -> Self {
        self.explanations = explanations;
        self
    }

    /// A step with neither options nor default target
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.options.is_empty() && self.default_next.is_none()
    }

    /// Whether a choice made here may be remembered and replayed
    #[must_use]
    pub fn is_replayable(&self) -> bool {
        !self.non_auto_select && !self.options.is_empty()
    }

    /// Find an option by its text
    #[must_use]
    pub fn option_by_text(&self, text: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.text == text)
    }
}

/// Immutable mapping from step id to step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepGraph {
    steps: IndexMap<StepId, Step>,
}

impl StepGraph {
    /// Id of the step a run starts at
    pub const START: &'static str = "1";

    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The synthetic one-step graph used when a dataset is unusable
    #[must_use]
    pub fn fallback() -> Self {
        let step = Step::new(Self::START, "エラー").with_explanations(Explanations {
            exp1: "CSVデータにエラーがあります。修正してからやり直してください。".to_string(),
            ..Explanations::default()
        });
        let mut steps = IndexMap::new();
        steps.insert(step.id.clone(), step);
        Self { steps }
    }

    /// Add a step
    ///
    /// # Errors
    ///
    /// Returns error if a step with the same id exists
    pub fn insert(&mut self, step: Step) -> CoreResult<()> {
        if self.steps.contains_key(&step.id) {
            return Err(CoreError::AlreadyExists {
                kind: "Step".to_string(),
                id: step.id.to_string(),
            });
        }
        self.steps.insert(step.id.clone(), step);
        Ok(())
    }

    /// Get step by id
    #[must_use]
    pub fn get(&self, id: &StepId) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Check whether a step exists
    #[must_use]
    pub fn contains(&self, id: &StepId) -> bool {
        self.steps.contains_key(id)
    }

    /// Steps in dataset order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    /// Get total step count
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<Step> for StepGraph {
    /// Later steps replace earlier ones with the same id
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }
}
