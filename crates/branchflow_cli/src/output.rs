//! Terminal output.

use branchflow_plan::ValidationReport;
use branchflow_runtime::{
    AUTO_SELECT_NOTICE, ButtonState, ChecklistItem, ClickOutcome, FlowEngine, Position,
    ReplayOutcome, SectionView,
};
use console::style;

/// Lines describing a validation report
#[must_use]
pub fn format_report(report: &ValidationReport, fallback: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for error in &report.errors {
        lines.push(format!("{} {error}", style("error:").red().bold()));
    }
    for warning in &report.warnings {
        lines.push(format!("{} {warning}", style("warning:").yellow().bold()));
    }
    if fallback {
        lines.push(format!(
            "{} dataset replaced by the fallback step",
            style("note:").cyan()
        ));
    }
    lines
}

/// Multi-line rendering of one section
#[must_use]
pub fn format_section(section: &SectionView) -> String {
    let marker = match section.position {
        Position::Current => style(">").green().bold().to_string(),
        Position::Past => " ".to_string(),
    };
    let mut out = format!(
        "{marker} #{} [{}] {}\n",
        section.index,
        section.step_id,
        section.title.as_deref().unwrap_or("")
    );
    if let Some(exp1) = &section.exp1 {
        out.push_str(&format!("    {exp1}\n"));
    }
    for item in &section.checklist {
        match item {
            ChecklistItem::Check { html, .. } => out.push_str(&format!("    [ ] {html}\n")),
            ChecklistItem::Spacer => out.push('\n'),
        }
    }
    if let Some(body) = &section.body {
        out.push_str(&format!("    {body}\n"));
    }
    if section.auto_selected {
        out.push_str(&format!("    {}\n", style(AUTO_SELECT_NOTICE).magenta()));
    }
    for (slot, button) in section.buttons.iter().enumerate() {
        let mark = if button.selected { "*" } else { " " };
        let state = match button.state {
            ButtonState::Forward => "",
            ButtonState::Rewind => " (rewind)",
            ButtonState::Locked => " (locked)",
        };
        out.push_str(&format!("    {mark} #{} {}{state}\n", slot + 1, button.html));
    }
    out
}

/// One line per history entry
#[must_use]
pub fn format_history(engine: &FlowEngine) -> String {
    let mut out = String::new();
    for (index, entry) in engine.history().iter().enumerate() {
        let chosen = entry.chosen_option.as_deref().unwrap_or("-");
        let auto = if entry.auto_selected { " (auto)" } else { "" };
        out.push_str(&format!(
            "{index}: {} seq={} -> {chosen}{auto}\n",
            entry.step_id, entry.sequence_id
        ));
    }
    out
}

/// Short description of a click
#[must_use]
pub fn describe_click(outcome: &ClickOutcome) -> String {
    match outcome {
        ClickOutcome::Advanced { step_id, .. } => format!("moved to {step_id}"),
        ClickOutcome::Rewound { step_id, .. } => format!("rewound to {step_id}"),
        ClickOutcome::Cancelled => "rewind cancelled".to_string(),
        ClickOutcome::Locked => "entry is locked".to_string(),
    }
}

/// Short description of a fired deferred advance
#[must_use]
pub fn describe_replay(outcome: &ReplayOutcome) -> String {
    match outcome {
        ReplayOutcome::Applied { step_id, .. } => format!("auto-advanced to {step_id}"),
        ReplayOutcome::Discarded { label, reason } => {
            format!("dropped auto-advance {label:?}: {reason}")
        }
    }
}
