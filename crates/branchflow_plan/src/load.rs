//! Loading pipeline from raw dataset text to a usable graph.
//!
//! gate -> tokenize -> build. Whatever goes wrong, the caller receives a
//! non-empty graph: an unusable dataset is replaced by
//! [`StepGraph::fallback`].

use super::builder::StepGraphBuilder;
use super::csv::tokenize;
use super::graph::StepGraph;
use super::validate::{ValidationError, ValidationReport};
use branchflow_policy::SafetyGate;

/// Result of loading a dataset
#[derive(Debug, Clone)]
pub struct LoadedFlow {
    /// Graph to run; the fallback graph when `fallback` is set
    pub graph: StepGraph,
    /// Every error and warning found
    pub report: ValidationReport,
    /// Whether the dataset was replaced by the fallback graph
    pub fallback: bool,
}

/// Loader for flow datasets
#[derive(Debug, Clone, Default)]
pub struct FlowLoader {
    gate: SafetyGate,
    builder: StepGraphBuilder,
}

impl FlowLoader {
    /// Create a loader with the default gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom gate
    #[must_use]
    pub fn with_gate(mut self, gate: SafetyGate) -> Self {
        self.gate = gate;
        self
    }

    /// Load raw dataset text
    #[must_use]
    pub fn load(&self, text: &str) -> LoadedFlow {
        let verdict = self.gate.check(text);
        if !verdict.is_safe() {
            tracing::error!(%verdict, "flow dataset rejected; using fallback graph");
            return LoadedFlow {
                graph: StepGraph::fallback(),
                report: ValidationReport::from_error(ValidationError::Unsafe {
                    reason: verdict.to_string(),
                }),
                fallback: true,
            };
        }

        let rows = tokenize(text);
        let output = self.builder.build(&rows);

        if !output.report.is_valid() || output.graph.is_empty() {
            tracing::warn!("flow dataset unusable; using fallback graph");
            return LoadedFlow {
                graph: StepGraph::fallback(),
                report: output.report,
                fallback: true,
            };
        }

        tracing::info!(steps = output.graph.len(), "flow dataset loaded");
        LoadedFlow {
            graph: output.graph,
            report: output.report,
            fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchflow_core::StepId;

    #[test]
    fn test_load_valid() {
        let flow = FlowLoader::new().load("StepID,タイトル,DefaultNext\n1,a,2\n2,b,\n");
        assert!(!flow.fallback);
        assert_eq!(flow.graph.len(), 2);
        assert!(flow.report.is_clean());
    }

    #[test]
    fn test_load_unsafe_uses_fallback() {
        let flow = FlowLoader::new().load("StepID,タイトル\n1,<script>alert(1)</script>\n");
        assert!(flow.fallback);
        assert_eq!(flow.graph, StepGraph::fallback());
        assert_eq!(flow.report.errors.len(), 1);
        assert!(matches!(flow.report.errors[0], ValidationError::Unsafe { .. }));
        assert_eq!(
            flow.report.errors[0].to_string(),
            "CSV data contains potentially dangerous content"
        );
    }

    #[test]
    fn test_load_oversized_uses_fallback() {
        let loader = FlowLoader::new().with_gate(SafetyGate::new().with_max_len(10));
        let flow = loader.load("StepID,タイトル\n1,a\n");
        assert!(flow.fallback);
    }

    #[test]
    fn test_load_invalid_keeps_report() {
        let flow = FlowLoader::new().load("StepID,タイトル\n1,a\n1,b\n");
        assert!(flow.fallback);
        assert!(flow.graph.contains(&StepId::new("1")));
        assert_eq!(flow.graph.get(&StepId::new("1")).map(|s| s.title.as_str()), Some("エラー"));
        assert_eq!(flow.report.errors.len(), 1);
    }

    #[test]
    fn test_load_empty_text() {
        let flow = FlowLoader::new().load("");
        assert!(flow.fallback);
        assert_eq!(flow.report.errors, vec![ValidationError::EmptyData]);
    }

    #[test]
    fn test_load_only_blank_ids_falls_back() {
        let flow = FlowLoader::new().load("StepID,タイトル\n,a\n");
        assert!(flow.report.is_valid());
        assert!(flow.fallback);
    }

    #[test]
    fn test_warnings_survive_successful_load() {
        let flow = FlowLoader::new().load("StepID,タイトル,DefaultNext\n1,a,missing\n");
        assert!(!flow.fallback);
        assert_eq!(flow.report.warnings.len(), 1);
    }
}
