//! A loaded flow ready to navigate.

use std::path::Path;

use branchflow_plan::{FlowLoader, ValidationReport, parse_highlight_words};
use branchflow_policy::Highlighter;
use branchflow_runtime::{FlowEngine, Presenter, SectionView};

use crate::config::BranchflowConfig;
use crate::error::{CliError, CliResult};

/// Engine plus everything needed to render it
#[derive(Debug)]
pub struct Session {
    /// Navigation engine
    pub engine: FlowEngine,
    /// Section renderer
    pub presenter: Presenter,
    /// Load-time errors and warnings
    pub report: ValidationReport,
    /// Whether the fallback graph replaced the dataset
    pub fallback: bool,
}

impl Session {
    /// Build a session from dataset text and optional highlight-word text
    #[must_use]
    pub fn new(config: &BranchflowConfig, flow: &str, words: Option<&str>) -> Self {
        let loaded = FlowLoader::new().with_gate(config.gate.clone()).load(flow);
        let words = words
            .map(|text| parse_highlight_words(&config.gate, text))
            .unwrap_or_default();
        tracing::debug!(words = words.len(), "highlight words loaded");

        Self {
            engine: FlowEngine::new(loaded.graph, config.engine.clone()),
            presenter: Presenter::new(config.sanitizer.clone(), Highlighter::new(words)),
            report: loaded.report,
            fallback: loaded.fallback,
        }
    }

    /// Read the dataset and word list from disk
    pub fn open(config: &BranchflowConfig, flow: &Path, words: Option<&Path>) -> CliResult<Self> {
        let flow_text = read(flow)?;
        let words_text = words.map(read).transpose()?;
        Ok(Self::new(config, &flow_text, words_text.as_deref()))
    }

    /// Sections for the whole history
    #[must_use]
    pub fn sections(&self) -> Vec<SectionView> {
        self.presenter.sections(&self.engine)
    }

    /// Section of the current entry
    #[must_use]
    pub fn current_section(&self) -> Option<SectionView> {
        let last = self.engine.history().len().checked_sub(1)?;
        self.presenter.section(&self.engine, last)
    }
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
