//! Line-based prompts.
//!
//! Answers are read with [`BufRead::read_line`], so the same prompter works
//! on a terminal, a pipe or an in-memory buffer. End of input declines.

use std::io::{BufRead, StdinLock, Write};

use branchflow_runtime::{Prompter, RewindRequest};
use console::{Term, style};

/// Asks before rewinding, reading answers one line at a time
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

/// Prompter reading stdin and writing to the stderr terminal
pub type TermPrompter = LinePrompter<StdinLock<'static>, Term>;

impl<R, W> LinePrompter<R, W> {
    /// With `assume_yes` every rewind is accepted without asking
    #[must_use]
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }
}

impl TermPrompter {
    /// Prompt on stderr, answers from stdin
    #[must_use]
    pub fn terminal(assume_yes: bool) -> Self {
        Self::new(std::io::stdin().lock(), Term::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm_rewind(&mut self, request: &RewindRequest) -> bool {
        if self.assume_yes {
            return true;
        }
        let question = format!(
            "Change the choice at #{} to {:?}? Everything after it is discarded. [y/N] ",
            request.index, request.label
        );
        match self.ask(&question) {
            Ok(Some(answer)) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Ok(None) => {
                tracing::warn!(
                    index = request.index,
                    "no answer before end of input; rewind declined"
                );
                false
            }
            Err(err) => {
                tracing::warn!(%err, "confirmation prompt failed; rewind declined");
                false
            }
        }
    }

    fn warn_auto_selected(&mut self, index: usize) {
        let message = format!(
            "{} #{index} was selected automatically; change an earlier choice to rewind past it",
            style("warning:").yellow().bold()
        );
        if let Err(err) = writeln!(self.output, "{message}") {
            tracing::warn!(%err, "failed to write warning");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchflow_core::{SequenceId, StepId};
    use std::io::Cursor;

    fn request() -> RewindRequest {
        RewindRequest {
            index: 0,
            label: "B".to_string(),
            target: StepId::new("3"),
            generation: 1,
            sequence_id: SequenceId::zero(),
        }
    }

    fn confirm(input: &str, assume_yes: bool) -> (bool, String) {
        let mut output = Vec::new();
        let mut prompter = LinePrompter::new(Cursor::new(input), &mut output, assume_yes);
        let confirmed = prompter.confirm_rewind(&request());
        drop(prompter);
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_confirm_reads_answer_line() {
        let (confirmed, output) = confirm("y\n", false);
        assert!(confirmed);
        assert!(output.contains("[y/N]"));
        assert!(confirm(" yes \n", false).0);
        assert!(!confirm("n\n", false).0);
        assert!(!confirm("\n", false).0);
    }

    #[test]
    fn test_end_of_input_declines() {
        assert!(!confirm("", false).0);
    }

    #[test]
    fn test_assume_yes_does_not_read() {
        let (confirmed, output) = confirm("", true);
        assert!(confirmed);
        assert!(output.is_empty());
    }

    #[test]
    fn test_warning_written_to_output() {
        let mut output = Vec::new();
        LinePrompter::new(Cursor::new(""), &mut output, false).warn_auto_selected(2);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("#2 was selected automatically"));
    }
}
