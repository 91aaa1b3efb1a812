//! BRANCHFLOW CLI
//!
//! Validate, render and navigate CSV-defined branching flows.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};

use branchflow_cli::output::{
    describe_click, describe_replay, format_history, format_report, format_section,
};
use branchflow_cli::{Applied, BranchflowConfig, Command, Session, TermPrompter, script};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::bail;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "branchflow")]
#[command(about = "BRANCHFLOW - CSV-driven branching flows", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a flow dataset
    Check {
        /// Flow CSV file
        #[arg(short, long)]
        flow: PathBuf,
        /// Highlight word CSV file
        #[arg(short, long)]
        words: Option<PathBuf>,
    },
    /// Print the sections of a single-step run
    Render {
        /// Flow CSV file
        #[arg(short, long)]
        flow: PathBuf,
        /// Highlight word CSV file
        #[arg(short, long)]
        words: Option<PathBuf>,
        /// Step to render instead of the start step
        #[arg(short, long)]
        step: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted sequence of choices
    Walk {
        /// Flow CSV file
        #[arg(short, long)]
        flow: PathBuf,
        /// Confirm every rewind without asking
        #[arg(short, long)]
        yes: bool,
        /// Commands: `label`, `#K`, `@N=label`, `:jump ID`, `:restart`
        choices: Vec<String>,
    },
    /// Navigate a flow interactively
    Play {
        /// Flow CSV file
        #[arg(short, long)]
        flow: PathBuf,
        /// Highlight word CSV file
        #[arg(short, long)]
        words: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,branchflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,branchflow=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = BranchflowConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { flow, words } => check(&config, &flow, words.as_deref()),
        Commands::Render {
            flow,
            words,
            step,
            json,
        } => render(&config, &flow, words.as_deref(), step.as_deref(), json),
        Commands::Walk { flow, yes, choices } => walk(&config, &flow, yes, &choices),
        Commands::Play { flow, words } => play(&config, &flow, words.as_deref()).await,
    }
}

fn check(config: &BranchflowConfig, flow: &Path, words: Option<&Path>) -> Result<()> {
    let session = Session::open(config, flow, words)?;
    for line in format_report(&session.report, session.fallback) {
        println!("{line}");
    }
    if session.fallback {
        bail!("{} is not a usable flow", flow.display());
    }
    println!(
        "{}: {} steps, {} warnings",
        flow.display(),
        session.engine.graph().len(),
        session.report.warnings.len()
    );
    Ok(())
}

fn render(
    config: &BranchflowConfig,
    flow: &Path,
    words: Option<&Path>,
    step: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut session = Session::open(config, flow, words)?;
    for line in format_report(&session.report, session.fallback) {
        eprintln!("{line}");
    }
    if let Some(step) = step {
        session.engine.jump(step)?;
    }

    let sections = session.sections();
    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else {
        for section in &sections {
            print!("{}", format_section(section));
        }
    }
    Ok(())
}

fn walk(config: &BranchflowConfig, flow: &Path, yes: bool, choices: &[String]) -> Result<()> {
    let mut session = Session::open(config, flow, None)?;
    for line in format_report(&session.report, session.fallback) {
        eprintln!("{line}");
    }
    let mut prompter = TermPrompter::terminal(yes);

    for raw in choices {
        let command = Command::parse(raw)?;
        match script::apply(&mut session.engine, &command, &mut prompter)? {
            Applied::Quit => break,
            Applied::Restarted => println!("{raw}: restarted"),
            Applied::Clicked(outcome) => println!("{raw}: {}", describe_click(&outcome)),
        }
        for outcome in session.engine.settle() {
            println!("  {}", describe_replay(&outcome));
        }
    }

    print!("{}", format_history(&session.engine));
    Ok(())
}

async fn play(config: &BranchflowConfig, flow: &Path, words: Option<&Path>) -> Result<()> {
    let mut session = Session::open(config, flow, words)?;
    for line in format_report(&session.report, session.fallback) {
        eprintln!("{line}");
    }
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout().lock();
    branchflow_cli::play::run(&mut session, &mut input, &mut output).await?;
    Ok(())
}
