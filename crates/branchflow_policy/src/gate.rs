//! Coarse pre-parse gate for raw payloads.
//!
//! The gate looks at the whole raw text before any tokenizing. A rejected
//! payload is unusable as a whole: callers must not try to salvage parts.

use crate::pattern::{ASCII_WORD, compile, tolerant};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Dangerous constructs the gate refuses to let through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DangerPattern {
    /// `<script`
    ScriptTag,
    /// `javascript:`
    JavascriptUrl,
    /// `data:`
    DataUrl,
    /// `eval(`
    Eval,
    /// `on<word>=` event handler attribute
    EventHandler,
    /// `<iframe`
    IframeTag,
    /// `<object`
    ObjectTag,
    /// `<embed`
    EmbedTag,
    /// `document.`
    DocumentAccess,
    /// `window.`
    WindowAccess,
    /// bare word `location`
    Location,
    /// `localStorage`
    LocalStorage,
    /// `sessionStorage`
    SessionStorage,
}

impl DangerPattern {
    /// All patterns, in evaluation order
    pub const ALL: [DangerPattern; 13] = [
        Self::ScriptTag,
        Self::JavascriptUrl,
        Self::DataUrl,
        Self::Eval,
        Self::EventHandler,
        Self::IframeTag,
        Self::ObjectTag,
        Self::EmbedTag,
        Self::DocumentAccess,
        Self::WindowAccess,
        Self::Location,
        Self::LocalStorage,
        Self::SessionStorage,
    ];

    /// Human readable name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScriptTag => "script tag",
            Self::JavascriptUrl => "javascript: url",
            Self::DataUrl => "data: url",
            Self::Eval => "eval call",
            Self::EventHandler => "event handler attribute",
            Self::IframeTag => "iframe tag",
            Self::ObjectTag => "object tag",
            Self::EmbedTag => "embed tag",
            Self::DocumentAccess => "document access",
            Self::WindowAccess => "window access",
            Self::Location => "location access",
            Self::LocalStorage => "localStorage access",
            Self::SessionStorage => "sessionStorage access",
        }
    }

    fn source(&self) -> String {
        match self {
            Self::ScriptTag => tolerant("<script"),
            Self::JavascriptUrl => tolerant("javascript:"),
            Self::DataUrl => tolerant("data:"),
            Self::Eval => tolerant("eval("),
            Self::EventHandler => format!(r"o\s*n\s*{}+\s*=", ASCII_WORD),
            Self::IframeTag => tolerant("<iframe"),
            Self::ObjectTag => tolerant("<object"),
            Self::EmbedTag => tolerant("<embed"),
            Self::DocumentAccess => tolerant("document."),
            Self::WindowAccess => tolerant("window."),
            // ASCII word boundaries on both sides
            Self::Location => format!(
                "(?:^|[^A-Za-z0-9_]){}(?:[^A-Za-z0-9_]|$)",
                tolerant("location")
            ),
            Self::LocalStorage => tolerant("localStorage"),
            Self::SessionStorage => tolerant("sessionStorage"),
        }
    }

    fn regex(&self) -> &'static Regex {
        static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
            DangerPattern::ALL
                .iter()
                .map(|p| compile(&p.source()))
                .collect()
        });
        &COMPILED[*self as usize]
    }

    /// Check whether the pattern occurs anywhere in `text`
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex().is_match(text)
    }
}

impl std::fmt::Display for DangerPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// Payload may be parsed
    Safe,
    /// Payload exceeds the size limit
    TooLarge {
        /// Length in characters
        len: usize,
        /// Configured limit
        limit: usize,
    },
    /// Payload contains a dangerous construct
    Dangerous {
        /// First pattern that matched
        pattern: DangerPattern,
    },
}

impl GateVerdict {
    /// Check if the payload may be parsed
    #[must_use]
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

impl std::fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::TooLarge { len, limit } => {
                write!(f, "payload of {} characters exceeds limit {}", len, limit)
            }
            Self::Dangerous { pattern } => write!(f, "dangerous pattern: {}", pattern),
        }
    }
}

/// Pre-parse safety gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyGate {
    /// Maximum payload length in characters
    pub max_len: usize,
}

impl SafetyGate {
    /// Default size limit
    pub const DEFAULT_MAX_LEN: usize = 5_000_000;

    /// Create a gate with the default limit
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }

    /// Set the size limit
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Check a raw payload, stopping at the first failure
    #[must_use]
    pub fn check(&self, text: &str) -> GateVerdict {
        // byte length bounds the character count from above
        if text.len() > self.max_len {
            let len = text.chars().count();
            if len > self.max_len {
                tracing::warn!(len, limit = self.max_len, "payload rejected: too large");
                return GateVerdict::TooLarge {
                    len,
                    limit: self.max_len,
                };
            }
        }

        for pattern in DangerPattern::ALL {
            if pattern.is_match(text) {
                tracing::warn!(pattern = pattern.name(), "payload rejected: dangerous pattern");
                return GateVerdict::Dangerous { pattern };
            }
        }

        GateVerdict::Safe
    }

    /// Check if a raw payload may be parsed
    #[must_use]
    pub fn is_safe(&self, text: &str) -> bool {
        self.check(text).is_safe()
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}
