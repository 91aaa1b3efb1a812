//! BRANCHFLOW Planner
//!
//! Turns the raw CSV text of a flow dataset into a validated, immutable
//! step graph. Structural problems are collected in one batch so a whole
//! dataset can be fixed in a single pass.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod csv;
pub mod graph;
pub mod load;
pub mod record;
pub mod validate;
pub mod words;

pub use builder::{BuildOutput, StepGraphBuilder};
pub use csv::{Row, render_row, tokenize};
pub use graph::{Explanations, Step, StepGraph, StepOption};
pub use load::{FlowLoader, LoadedFlow};
pub use record::{Column, Header, Record};
pub use validate::{ValidationError, ValidationReport, ValidationWarning, Validator};
pub use words::parse_highlight_words;
