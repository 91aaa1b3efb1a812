//! Renderer-facing projection of the engine state.
//!
//! One [`SectionView`] per history entry, with every user-facing string
//! already sanitized and highlighted. Renderers only lay these out and
//! route clicks back through [`FlowEngine::click`].

use branchflow_core::{SequenceId, StepId};
use branchflow_plan::Step;
use branchflow_policy::{Highlighter, Sanitizer, escape_html, render_safe_html};
use serde::Serialize;

use crate::engine::{Button, FlowEngine};
use crate::history::HistoryEntry;

/// Notice shown on an entry filled in by auto-replay
pub const AUTO_SELECT_NOTICE: &str = "※前回と同じ選択肢が自動選択されました";

/// Where a section sits in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Last entry
    Current,
    /// Any earlier entry
    Past,
}

/// One line of a step's checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChecklistItem {
    /// Checkbox with a label
    Check {
        /// Element id, `nota-check-<sequence>-<line>`
        id: String,
        /// Rendered label
        html: String,
    },
    /// Blank source line
    Spacer,
}

/// How a button reacts to a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    /// Moves forward from the current entry
    Forward,
    /// Asks to rewind a past entry
    Rewind,
    /// Auto-selected entry; only warns
    Locked,
}

/// A rendered button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    /// Button to pass back to [`FlowEngine::click`]
    #[serde(skip)]
    pub button: Button,
    /// Rendered label
    pub html: String,
    /// Whether this button holds the entry's choice
    pub selected: bool,
    /// Click behaviour
    pub state: ButtonState,
}

/// A rendered history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    /// History index
    pub index: usize,
    /// Sequence id of the entry
    pub sequence_id: SequenceId,
    /// Step shown
    pub step_id: StepId,
    /// Current or past
    pub position: Position,
    /// Rendered title
    pub title: Option<String>,
    /// Rendered first paragraph
    pub exp1: Option<String>,
    /// Checklist, empty when the step has none
    pub checklist: Vec<ChecklistItem>,
    /// Rendered second and third paragraphs
    pub body: Option<String>,
    /// Whether the auto-select notice is shown
    pub auto_selected: bool,
    /// Buttons in display order
    pub buttons: Vec<ButtonView>,
}

/// Builds section views from an engine
#[derive(Debug, Clone, Default)]
pub struct Presenter {
    sanitizer: Sanitizer,
    highlighter: Highlighter,
}

impl Presenter {
    /// Create a presenter
    #[must_use]
    pub fn new(sanitizer: Sanitizer, highlighter: Highlighter) -> Self {
        Self {
            sanitizer,
            highlighter,
        }
    }

    /// Sections for the whole history. Entries whose step is missing are
    /// skipped.
    #[must_use]
    pub fn sections(&self, engine: &FlowEngine) -> Vec<SectionView> {
        (0..engine.history().len())
            .filter_map(|index| self.section(engine, index))
            .collect()
    }

    /// Section for one history entry
    #[must_use]
    pub fn section(&self, engine: &FlowEngine, index: usize) -> Option<SectionView> {
        let history = engine.history();
        let entry = history.get(index)?;
        let Some(step) = engine.graph().get(&entry.step_id) else {
            tracing::error!(step = %entry.step_id, index, "history entry without step");
            return None;
        };
        let position = if history.is_current(index) {
            Position::Current
        } else {
            Position::Past
        };

        Some(SectionView {
            index,
            sequence_id: entry.sequence_id,
            step_id: step.id.clone(),
            position,
            title: self.render_nonempty(&step.title),
            exp1: self.render_nonempty(&step.explanations.exp1),
            checklist: self.checklist(entry.sequence_id, &step.explanations.nota),
            body: self.render_nonempty(&join_body(step)),
            auto_selected: entry.auto_selected,
            buttons: self.buttons(engine, entry, step, position),
        })
    }

    fn render(&self, text: &str) -> String {
        render_safe_html(&self.sanitizer, text, &self.highlighter)
    }

    fn render_nonempty(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            None
        } else {
            Some(self.render(text))
        }
    }

    fn checklist(&self, sequence_id: SequenceId, nota: &str) -> Vec<ChecklistItem> {
        if nota.is_empty() {
            return Vec::new();
        }
        nota.split('\n')
            .enumerate()
            .map(|(line, text)| {
                if text.trim().is_empty() {
                    ChecklistItem::Spacer
                } else {
                    ChecklistItem::Check {
                        id: format!("nota-check-{sequence_id}-{line}"),
                        html: self.render(text),
                    }
                }
            })
            .collect()
    }

    fn buttons(
        &self,
        engine: &FlowEngine,
        entry: &HistoryEntry,
        step: &Step,
        position: Position,
    ) -> Vec<ButtonView> {
        let state = if entry.auto_selected {
            ButtonState::Locked
        } else if position == Position::Past {
            ButtonState::Rewind
        } else {
            ButtonState::Forward
        };
        let chosen = entry.chosen_option.as_deref();

        if !step.options.is_empty() {
            return step
                .options
                .iter()
                .enumerate()
                .map(|(slot, option)| ButtonView {
                    button: Button::Option(slot),
                    html: self.render(&option.text),
                    selected: chosen == Some(option.text.as_str()),
                    state,
                })
                .collect();
        }

        match step.default_next {
            Some(_) => vec![ButtonView {
                button: Button::Next,
                html: escape_html(&engine.config().next_label),
                selected: false,
                state,
            }],
            None => Vec::new(),
        }
    }
}

/// exp2 and exp3 joined by a line break, skipping empty parts
fn join_body(step: &Step) -> String {
    let explanations = &step.explanations;
    match (explanations.exp2.is_empty(), explanations.exp3.is_empty()) {
        (false, false) => format!("{}\n{}", explanations.exp2, explanations.exp3),
        (false, true) => explanations.exp2.clone(),
        (true, false) => explanations.exp3.clone(),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use branchflow_plan::{Explanations, StepGraph};

    fn graph() -> StepGraph {
        let explanations = Explanations {
            exp1: "Read <b>this</b>".to_string(),
            nota: "check power\n\ncheck cable".to_string(),
            exp2: "second".to_string(),
            exp3: "third".to_string(),
        };
        vec![
            Step::new("1", "Start")
                .with_explanations(explanations)
                .with_option("A", "2")
                .with_option("B", "3"),
            Step::new("2", "Left").with_default_next("4"),
            Step::new("3", "Right").with_option("B", "4").with_option("A", "4"),
            Step::new("4", ""),
        ]
        .into_iter()
        .collect()
    }

    fn presenter() -> Presenter {
        Presenter::new(Sanitizer::default(), Highlighter::new(["power"]))
    }

    #[test]
    fn test_current_section() {
        let engine = FlowEngine::new(graph(), EngineConfig::default());
        let sections = presenter().sections(&engine);
        assert_eq!(sections.len(), 1);

        let section = &sections[0];
        assert_eq!(section.position, Position::Current);
        assert_eq!(section.title.as_deref(), Some("Start"));
        assert_eq!(
            section.exp1.as_deref(),
            Some("Read &lt;b&gt;this&lt;/b&gt;")
        );
        assert_eq!(section.body.as_deref(), Some("second<br>third"));
        assert!(!section.auto_selected);
        assert_eq!(section.buttons.len(), 2);
        assert!(section.buttons.iter().all(|b| b.state == ButtonState::Forward));
        assert!(section.buttons.iter().all(|b| !b.selected));
    }

    #[test]
    fn test_checklist_ids_and_spacers() {
        let engine = FlowEngine::new(graph(), EngineConfig::default());
        let section = presenter().section(&engine, 0).unwrap();
        assert_eq!(
            section.checklist,
            vec![
                ChecklistItem::Check {
                    id: "nota-check-0-0".to_string(),
                    html: "check <span class=\"csv-text-highlight\">power</span>".to_string(),
                },
                ChecklistItem::Spacer,
                ChecklistItem::Check {
                    id: "nota-check-0-2".to_string(),
                    html: "check cable".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_past_and_next_buttons() {
        let mut engine = FlowEngine::new(graph(), EngineConfig::default());
        engine.choose(0, "A", &StepId::new("2")).unwrap();
        let sections = presenter().sections(&engine);

        let past = &sections[0];
        assert_eq!(past.position, Position::Past);
        assert!(past.buttons.iter().all(|b| b.state == ButtonState::Rewind));
        assert!(past.buttons[0].selected);
        assert!(!past.buttons[1].selected);

        let current = &sections[1];
        assert_eq!(current.buttons.len(), 1);
        assert_eq!(current.buttons[0].button, Button::Next);
        assert_eq!(current.buttons[0].html, "次へ");
        assert!(current.exp1.is_none());
        assert!(current.checklist.is_empty());
        assert!(current.body.is_none());
    }

    #[test]
    fn test_auto_selected_section_locked() {
        let mut engine = FlowEngine::new(graph(), EngineConfig::default());
        engine.choose(0, "B", &StepId::new("3")).unwrap();
        let section = presenter().section(&engine, 1).unwrap();

        assert!(section.auto_selected);
        assert!(section.buttons.iter().all(|b| b.state == ButtonState::Locked));
        // options are B, A in column order; B was replayed
        assert!(section.buttons[0].selected);
    }

    #[test]
    fn test_terminal_without_title() {
        let mut engine = FlowEngine::new(graph(), EngineConfig::default());
        engine.jump("4").unwrap();
        let section = presenter().section(&engine, 0).unwrap();
        assert!(section.title.is_none());
        assert!(section.buttons.is_empty());
    }

    #[test]
    fn test_section_serializes() {
        let engine = FlowEngine::new(graph(), EngineConfig::default());
        let section = presenter().section(&engine, 0).unwrap();
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["position"], "current");
        assert_eq!(json["step_id"], "1");
        assert_eq!(json["checklist"][1]["kind"], "spacer");
    }
}
