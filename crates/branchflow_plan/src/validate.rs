//! Batch validator for flow datasets.
//!
//! Every problem in a dataset is collected before anything is reported.
//! Errors make the dataset unusable; warnings (links to undeclared steps)
//! never block construction.

use super::record::{Column, Header, OPTION_SLOTS, Record};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Structural error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// Payload rejected by the safety gate
    Unsafe {
        /// Gate verdict text; logged, not part of the message
        reason: String,
    },
    /// No data rows
    EmptyData,
    /// Required column absent from the header
    MissingColumn {
        /// Canonical column name
        column: String,
    },
    /// Step id declared twice
    DuplicateStepId {
        /// Repeated id
        id: String,
        /// 1-based CSV line of the repeat
        line: usize,
    },
    /// Option with text but no target
    DanglingOption {
        /// Step holding the option
        step: String,
        /// Option slot, 1..=5
        slot: u8,
        /// Option text
        text: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsafe { .. } => write!(f, "CSV data contains potentially dangerous content"),
            Self::EmptyData => write!(f, "CSV data is empty or invalid"),
            Self::MissingColumn { column } => {
                write!(f, "Required column \"{}\" is missing from the CSV data", column)
            }
            Self::DuplicateStepId { id, line } => {
                write!(f, "Duplicate StepID \"{}\" found on row {}", id, line)
            }
            Self::DanglingOption { step, slot, text } => write!(
                f,
                "Step {}: option {} \"{}\" has no next step",
                step, slot, text
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Structural warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationWarning {
    /// `DefaultNext` points at an undeclared step
    BrokenDefaultNext {
        /// Step holding the link
        step: String,
        /// Undeclared target
        target: String,
    },
    /// An option points at an undeclared step
    BrokenOptionLink {
        /// Step holding the option
        step: String,
        /// Option slot, 1..=5
        slot: u8,
        /// Option text (may be empty)
        text: String,
        /// Undeclared target
        target: String,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BrokenDefaultNext { step, target } => write!(
                f,
                "Step {}: the next button points at unknown step \"{}\"",
                step, target
            ),
            Self::BrokenOptionLink {
                step,
                slot,
                text,
                target,
            } => write!(
                f,
                "Step {}: option {} \"{}\" points at unknown step \"{}\"",
                step, slot, text, target
            ),
        }
    }
}

/// All issues found in one dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Blocking problems
    pub errors: Vec<ValidationError>,
    /// Non-blocking problems
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report holding a single error
    #[must_use]
    pub fn from_error(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// True when there are no errors
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when there is nothing to report
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validator for flow datasets
#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a header and its records
    #[must_use]
    pub fn validate(&self, header: &Header, records: &[Record<'_>]) -> ValidationReport {
        let mut report = ValidationReport::new();

        if records.is_empty() {
            report.errors.push(ValidationError::EmptyData);
            return report;
        }

        for column in Column::REQUIRED {
            if !header.has(column) {
                report.errors.push(ValidationError::MissingColumn {
                    column: column.name(),
                });
            }
        }

        let declared = self.check_unique(records, &mut report);

        for record in records.iter().filter(|r| !r.step_id().is_empty()) {
            self.check_links(record, &declared, &mut report);
        }

        if !report.errors.is_empty() {
            tracing::error!(errors = report.errors.len(), "flow dataset has errors");
        }
        if !report.warnings.is_empty() {
            tracing::warn!(warnings = report.warnings.len(), "flow dataset has warnings");
        }

        report
    }

    /// Check step id uniqueness, returning the declared ids
    fn check_unique<'a>(
        &self,
        records: &[Record<'a>],
        report: &mut ValidationReport,
    ) -> IndexSet<&'a str> {
        let mut declared = IndexSet::new();
        for record in records {
            let id = record.step_id();
            if id.is_empty() {
                continue;
            }
            if !declared.insert(id) {
                report.errors.push(ValidationError::DuplicateStepId {
                    id: id.to_string(),
                    line: record.line(),
                });
            }
        }
        declared
    }

    /// Check the outgoing links of one record
    fn check_links(
        &self,
        record: &Record<'_>,
        declared: &IndexSet<&str>,
        report: &mut ValidationReport,
    ) {
        let step = record.step_id();

        let default_next = record.get(Column::DefaultNext);
        if !default_next.is_empty() && !declared.contains(default_next) {
            report.warnings.push(ValidationWarning::BrokenDefaultNext {
                step: step.to_string(),
                target: default_next.to_string(),
            });
        }

        for slot in 1..=OPTION_SLOTS {
            let (text, next) = record.option(slot);
            if !text.is_empty() && next.is_empty() {
                report.errors.push(ValidationError::DanglingOption {
                    step: step.to_string(),
                    slot,
                    text: text.to_string(),
                });
            } else if !next.is_empty() && !declared.contains(next) {
                report.warnings.push(ValidationWarning::BrokenOptionLink {
                    step: step.to_string(),
                    slot,
                    text: text.to_string(),
                    target: next.to_string(),
                });
            }
        }
    }
}
