//! Interactive loop behind `branchflow play`.
//!
//! Commands are read line by line from any [`BufRead`]; rewind
//! confirmations are answered from the same input. End of input ends the
//! loop like `:quit`.

use std::io::{BufRead, Write};

use crate::error::CliResult;
use crate::output::{describe_click, describe_replay, format_history, format_section};
use crate::prompt::LinePrompter;
use crate::script::{self, Applied, Command};
use crate::session::Session;

/// Usage line printed when the loop starts
pub const USAGE: &str = "commands: label, #K, @N=label, :jump ID, :restart, :quit";

/// Run the loop until `:quit` or end of input, then print the history
pub async fn run<R, W>(session: &mut Session, input: &mut R, output: &mut W) -> CliResult<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{USAGE}")?;

    loop {
        show_current(session, output)?;
        wait_for_replay(session, output).await?;

        write!(output, "> ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            tracing::debug!("end of input");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };
        let applied = {
            let mut prompter = LinePrompter::new(&mut *input, &mut *output, false);
            script::apply(&mut session.engine, &command, &mut prompter)
        };
        match applied {
            Ok(Applied::Quit) => break,
            Ok(Applied::Restarted) => writeln!(output, "restarted")?,
            Ok(Applied::Clicked(outcome)) => writeln!(output, "{}", describe_click(&outcome))?,
            Err(err) => writeln!(output, "{err}")?,
        }
    }

    write!(output, "{}", format_history(&session.engine))?;
    Ok(())
}

/// Sleep through pending auto-replay delays, showing each step reached.
/// Gives up after `settle_limit` advances since replay chains may cycle.
async fn wait_for_replay<W: Write>(session: &mut Session, output: &mut W) -> CliResult<()> {
    let limit = session.engine.config().settle_limit;
    let mut fired = 0;
    while let Some(due) = session.engine.next_due() {
        if fired >= limit {
            session.engine.cancel_pending();
            writeln!(output, "auto-replay stopped after {fired} steps")?;
            break;
        }
        let delay = due.since(session.engine.clock());
        tokio::time::sleep(delay.to_std()).await;
        for outcome in session.engine.advance_clock(delay) {
            fired += 1;
            writeln!(output, "{}", describe_replay(&outcome))?;
        }
        show_current(session, output)?;
    }
    Ok(())
}

fn show_current<W: Write>(session: &Session, output: &mut W) -> CliResult<()> {
    if let Some(section) = session.current_section() {
        write!(output, "{}", format_section(&section))?;
    }
    Ok(())
}
