//! Command language shared by `walk` and `play`.
//!
//! ```text
//! label        choose `label` on the current step
//! #K           choose option slot K (1-based) on the current step
//! @N=label     choose `label` at history index N (rewind when N is past)
//! :jump ID     restart at step ID
//! :restart     restart at the start step
//! :quit        leave
//! ```

use branchflow_runtime::{Button, ClickOutcome, FlowEngine, FlowError, Prompter};

use crate::error::{CliError, CliResult};

/// Label accepted for the default-target button besides the configured one
pub const NEXT_ALIAS: &str = "next";

/// One parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose by label on the current step
    Choose(String),
    /// Choose an option slot on the current step, zero-based
    Slot(usize),
    /// Choose by label at a history index
    ChooseAt {
        /// History index
        index: usize,
        /// Label
        label: String,
    },
    /// Restart at a step
    Jump(String),
    /// Restart at the start step
    Restart,
    /// Leave the session
    Quit,
}

impl Command {
    /// Parse one command
    pub fn parse(input: &str) -> CliResult<Self> {
        let input = input.trim();
        let invalid = |reason| CliError::InvalidCommand {
            input: input.to_string(),
            reason,
        };

        if input.is_empty() {
            return Err(invalid("empty command"));
        }
        if let Some(rest) = input.strip_prefix(':') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            return match (parts.next(), parts.next().map(str::trim)) {
                (Some("jump"), Some(id)) if !id.is_empty() => Ok(Self::Jump(id.to_string())),
                (Some("jump"), _) => Err(invalid("missing step id")),
                (Some("restart"), None) => Ok(Self::Restart),
                (Some("quit" | "q"), None) => Ok(Self::Quit),
                _ => Err(invalid("unknown directive")),
            };
        }
        if let Some(rest) = input.strip_prefix('#') {
            let slot: usize = rest.parse().map_err(|_| invalid("slot must be a number"))?;
            return slot
                .checked_sub(1)
                .map(Self::Slot)
                .ok_or_else(|| invalid("slots start at 1"));
        }
        if let Some(rest) = input.strip_prefix('@') {
            let (index, label) = rest
                .split_once('=')
                .ok_or_else(|| invalid("expected @N=label"))?;
            let index = index
                .trim()
                .parse()
                .map_err(|_| invalid("index must be a number"))?;
            return Ok(Self::ChooseAt {
                index,
                label: label.trim().to_string(),
            });
        }
        Ok(Self::Choose(input.to_string()))
    }
}

/// What applying a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A button was clicked
    Clicked(ClickOutcome),
    /// A new run started
    Restarted,
    /// The user asked to leave
    Quit,
}

/// Button on the entry at `index` carrying `label`
#[must_use]
pub fn resolve_button(engine: &FlowEngine, index: usize, label: &str) -> Option<Button> {
    let entry = engine.history().get(index)?;
    let step = engine.graph().get(&entry.step_id)?;
    if let Some(slot) = step.options.iter().position(|option| option.text == label) {
        return Some(Button::Option(slot));
    }
    let is_next = label == engine.config().next_label || label == NEXT_ALIAS;
    (step.options.is_empty() && step.default_next.is_some() && is_next).then_some(Button::Next)
}

/// Apply a command to an engine
pub fn apply<P>(engine: &mut FlowEngine, command: &Command, prompter: &mut P) -> CliResult<Applied>
where
    P: Prompter + ?Sized,
{
    let current = engine.history().len().checked_sub(1);
    let (index, button) = match command {
        Command::Quit => return Ok(Applied::Quit),
        Command::Restart => {
            engine.restart()?;
            return Ok(Applied::Restarted);
        }
        Command::Jump(id) => {
            engine.jump(id)?;
            return Ok(Applied::Restarted);
        }
        Command::Slot(slot) => {
            let index = current.ok_or(FlowError::EmptyHistory)?;
            (index, Button::Option(*slot))
        }
        Command::Choose(label) => {
            let index = current.ok_or(FlowError::EmptyHistory)?;
            (index, lookup(engine, index, label)?)
        }
        Command::ChooseAt { index, label } => (*index, lookup(engine, *index, label)?),
    };
    let outcome = engine.click(index, button, prompter)?;
    Ok(Applied::Clicked(outcome))
}

fn lookup(engine: &FlowEngine, index: usize, label: &str) -> CliResult<Button> {
    resolve_button(engine, index, label).ok_or_else(|| CliError::UnknownChoice {
        index,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchflow_plan::{Step, StepGraph};
    use branchflow_runtime::{AutoConfirm, EngineConfig};

    fn engine() -> FlowEngine {
        let graph: StepGraph = vec![
            Step::new("1", "start").with_option("A", "2").with_option("B", "3"),
            Step::new("2", "left").with_default_next("4"),
            Step::new("3", "right").with_default_next("4"),
            Step::new("4", "end"),
        ]
        .into_iter()
        .collect();
        FlowEngine::new(graph, EngineConfig::default())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(" A ").unwrap(), Command::Choose("A".to_string()));
        assert_eq!(Command::parse("#2").unwrap(), Command::Slot(1));
        assert_eq!(
            Command::parse("@0=B").unwrap(),
            Command::ChooseAt {
                index: 0,
                label: "B".to_string()
            }
        );
        assert_eq!(Command::parse(":jump 7").unwrap(), Command::Jump("7".to_string()));
        assert_eq!(Command::parse(":restart").unwrap(), Command::Restart);
        assert_eq!(Command::parse(":q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_rejects() {
        for input in ["", "#0", "#x", "@x=A", "@1", ":jump", ":dance"] {
            assert!(
                matches!(Command::parse(input), Err(CliError::InvalidCommand { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_button() {
        let mut engine = engine();
        assert_eq!(resolve_button(&engine, 0, "B"), Some(Button::Option(1)));
        assert_eq!(resolve_button(&engine, 0, "next"), None);

        engine.choose(0, "A", &"2".into()).unwrap();
        assert_eq!(resolve_button(&engine, 1, "次へ"), Some(Button::Next));
        assert_eq!(resolve_button(&engine, 1, NEXT_ALIAS), Some(Button::Next));
        assert_eq!(resolve_button(&engine, 1, "A"), None);
        assert_eq!(resolve_button(&engine, 5, "A"), None);
    }

    #[test]
    fn test_walk_script() {
        let mut engine = engine();
        let mut prompter = AutoConfirm::default();
        for input in ["A", "next", "@0=B"] {
            let command = Command::parse(input).unwrap();
            apply(&mut engine, &command, &mut prompter).unwrap();
        }
        let steps: Vec<&str> = engine.history().iter().map(|e| e.step_id.as_str()).collect();
        assert_eq!(steps, vec!["1", "3"]);
    }

    #[test]
    fn test_unknown_label() {
        let mut engine = engine();
        let mut prompter = AutoConfirm::default();
        let command = Command::parse("C").unwrap();
        assert!(matches!(
            apply(&mut engine, &command, &mut prompter),
            Err(CliError::UnknownChoice { index: 0, .. })
        ));
    }

    #[test]
    fn test_jump_errors_surface() {
        let mut engine = engine();
        let mut prompter = AutoConfirm::default();
        let command = Command::parse(":jump x!").unwrap();
        assert!(matches!(
            apply(&mut engine, &command, &mut prompter),
            Err(CliError::Flow(FlowError::InvalidStepId { .. }))
        ));
    }
}
