//! Typed access to CSV rows through the header.
//!
//! The header row is resolved once into a [`Header`]; data rows are then
//! read through [`Record`] by [`Column`], never by raw string key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maximum number of option slots per step
pub const OPTION_SLOTS: u8 = 5;

/// A recognised column of the flow dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    /// `StepID`
    StepId,
    /// Step title
    Title,
    /// First explanation paragraph
    Exp1,
    /// Supplementary notes, rendered as a checklist
    Nota,
    /// Second explanation paragraph
    Exp2,
    /// Third explanation paragraph
    Exp3,
    /// `Option<n>Text`, n in 1..=5
    OptionText(u8),
    /// `Option<n>Next`, n in 1..=5
    OptionNext(u8),
    /// `DefaultNext`
    DefaultNext,
    /// `NonAutoSelect`
    NonAutoSelect,
}

impl Column {
    /// Resolve a trimmed header name
    #[must_use]
    pub fn from_header(name: &str) -> Option<Self> {
        let column = match name {
            "StepID" => Self::StepId,
            "タイトル" | "Title" => Self::Title,
            "説明１" | "Exp1" => Self::Exp1,
            "補足説明１" | "Nota" => Self::Nota,
            "説明２" | "Exp2" => Self::Exp2,
            "説明３" | "Exp3" => Self::Exp3,
            "DefaultNext" => Self::DefaultNext,
            "NonAutoSelect" => Self::NonAutoSelect,
            _ => return Self::option_column(name),
        };
        Some(column)
    }

    fn option_column(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("Option")?;
        let mut chars = rest.chars();
        let slot = chars.next()?.to_digit(10)?;
        let slot = u8::try_from(slot).ok().filter(|s| (1..=OPTION_SLOTS).contains(s))?;
        match chars.as_str() {
            "Text" => Some(Self::OptionText(slot)),
            "Next" => Some(Self::OptionNext(slot)),
            _ => None,
        }
    }

    /// Canonical header name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::StepId => "StepID".to_string(),
            Self::Title => "タイトル".to_string(),
            Self::Exp1 => "説明１".to_string(),
            Self::Nota => "補足説明１".to_string(),
            Self::Exp2 => "説明２".to_string(),
            Self::Exp3 => "説明３".to_string(),
            Self::OptionText(n) => format!("Option{}Text", n),
            Self::OptionNext(n) => format!("Option{}Next", n),
            Self::DefaultNext => "DefaultNext".to_string(),
            Self::NonAutoSelect => "NonAutoSelect".to_string(),
        }
    }

    /// Columns a dataset must declare
    pub const REQUIRED: [Column; 2] = [Column::StepId, Column::Title];
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Resolved header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    positions: IndexMap<Column, usize>,
    unknown: Vec<String>,
}

impl Header {
    /// Resolve a raw header row; names are trimmed, the last duplicate wins
    #[must_use]
    pub fn parse(row: &[String]) -> Self {
        let mut header = Self::default();
        for (index, raw) in row.iter().enumerate() {
            let name = raw.trim();
            match Column::from_header(name) {
                Some(column) => {
                    header.positions.insert(column, index);
                }
                None if !name.is_empty() => header.unknown.push(name.to_string()),
                None => {}
            }
        }
        header
    }

    /// Position of a column, if declared
    #[must_use]
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// Check whether a column is declared
    #[must_use]
    pub fn has(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Header names that map to no known column
    #[must_use]
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }
}

/// A data row viewed through the header
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    header: &'a Header,
    fields: &'a [String],
    line: usize,
}

impl<'a> Record<'a> {
    /// Create a record; `line` is the 1-based CSV line, header included
    #[must_use]
    pub fn new(header: &'a Header, fields: &'a [String], line: usize) -> Self {
        Self {
            header,
            fields,
            line,
        }
    }

    /// Trimmed value of a column; undeclared columns and short rows read as empty
    #[must_use]
    pub fn get(&self, column: Column) -> &'a str {
        self.header
            .position(column)
            .and_then(|i| self.fields.get(i))
            .map_or("", |f| f.trim())
    }

    /// 1-based CSV line of this record
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// The step id of this record (may be empty)
    #[must_use]
    pub fn step_id(&self) -> &'a str {
        self.get(Column::StepId)
    }

    /// Text and target of an option slot, in that order
    #[must_use]
    pub fn option(&self, slot: u8) -> (&'a str, &'a str) {
        (
            self.get(Column::OptionText(slot)),
            self.get(Column::OptionNext(slot)),
        )
    }

    /// Whether the row opts out of auto-selection
    #[must_use]
    pub fn non_auto_select(&self) -> bool {
        parse_flag(self.get(Column::NonAutoSelect))
    }
}

/// Interpret a flag cell: `1` or case-insensitive `true`
#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    let value = raw.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}
