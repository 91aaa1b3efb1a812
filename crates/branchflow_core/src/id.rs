//! Identifiers for BRANCHFLOW entities.
//!
//! Step ids come from the dataset and are free-form strings. Ids supplied
//! from outside the dataset (jump menus, command lines) must additionally
//! match [`StepId::JUMP_PATTERN`] before they are looked up.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static JUMP_RE: Lazy<Regex> = Lazy::new(|| match Regex::new(StepId::JUMP_PATTERN) {
    Ok(re) => re,
    Err(err) => panic!("invalid jump pattern: {}", err),
});

/// Step identifier - the `StepID` column of a flow dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Pattern every externally supplied jump target must match
    pub const JUMP_PATTERN: &'static str = r"^[A-Za-z0-9_-]+$";

    /// Wrap an id taken from the dataset, without pattern checks
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an externally supplied id
    ///
    /// # Errors
    ///
    /// Returns error if the id does not match [`Self::JUMP_PATTERN`]
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if JUMP_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CoreError::InvalidId {
                reason: format!("{:?} does not match {}", raw, Self::JUMP_PATTERN),
            })
        }
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the id is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sequence identifier - assigned to each history entry at push time
///
/// Monotonic within a run and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(u64);

impl SequenceId {
    /// First sequence id of a run
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create from raw value
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id that follows this one
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run identifier - identifies one run, from a start to the next start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run_{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_parse_accepts_pattern_alphabet(raw in "[A-Za-z0-9_-]{1,32}") {
            prop_assert!(StepId::parse(&raw).is_ok());
        }

        #[test]
        fn prop_parse_rejects_whitespace(prefix in "[a-z0-9]{0,8}", suffix in "[a-z0-9]{0,8}") {
            let raw = format!("{} {}", prefix, suffix);
            prop_assert!(StepId::parse(&raw).is_err());
        }
    }
}
