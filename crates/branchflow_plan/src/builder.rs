//! Builder from tokenized rows to a step graph.

use super::csv::Row;
use super::graph::{Explanations, Step, StepGraph, StepOption};
use super::record::{Column, Header, OPTION_SLOTS, Record};
use super::validate::{ValidationReport, Validator};
use branchflow_core::StepId;

/// Output from building a dataset
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Materialized graph; empty when the report has errors
    pub graph: StepGraph,
    /// Errors and warnings
    pub report: ValidationReport,
}

/// Builder for transforming rows into a step graph
#[derive(Debug, Clone, Default)]
pub struct StepGraphBuilder {
    validator: Validator,
}

impl StepGraphBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from rows; the first row is the header
    #[must_use]
    pub fn build(&self, rows: &[Row]) -> BuildOutput {
        let (header, data) = match rows.split_first() {
            Some((first, rest)) => (Header::parse(first), rest),
            None => (Header::default(), &[][..]),
        };

        if !header.unknown().is_empty() {
            tracing::debug!(columns = ?header.unknown(), "ignoring unknown columns");
        }

        let records: Vec<Record<'_>> = data
            .iter()
            .enumerate()
            .map(|(i, fields)| Record::new(&header, fields, i + 2))
            .collect();

        let report = self.validator.validate(&header, &records);
        if !report.is_valid() {
            return BuildOutput {
                graph: StepGraph::new(),
                report,
            };
        }

        let graph = records
            .iter()
            .filter(|r| !r.step_id().is_empty())
            .map(materialize)
            .collect();

        BuildOutput { graph, report }
    }
}

/// Map one validated record onto a step
fn materialize(record: &Record<'_>) -> Step {
    let options = (1..=OPTION_SLOTS)
        .map(|slot| record.option(slot))
        .filter(|(text, next)| !text.is_empty() && !next.is_empty())
        .map(|(text, next)| StepOption::new(text, next))
        .collect();

    let default_next = Some(record.get(Column::DefaultNext))
        .filter(|next| !next.is_empty())
        .map(StepId::new);

    Step {
        id: StepId::new(record.step_id()),
        title: record.get(Column::Title).to_string(),
        explanations: Explanations {
            exp1: record.get(Column::Exp1).to_string(),
            nota: record.get(Column::Nota).to_string(),
            exp2: record.get(Column::Exp2).to_string(),
            exp3: record.get(Column::Exp3).to_string(),
        },
        options,
        default_next,
        non_auto_select: record.non_auto_select(),
    }
}
