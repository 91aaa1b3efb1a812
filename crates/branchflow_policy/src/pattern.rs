//! Whitespace-tolerant pattern construction.
//!
//! Obfuscated payloads such as `j a v a s c r i p t :` are matched by
//! allowing arbitrary whitespace between every literal character.

use regex::Regex;

/// ASCII word character class, matching what browsers treat as `\w`
pub const ASCII_WORD: &str = "[A-Za-z0-9_]";

/// Build the pattern source for a literal token, whitespace allowed between characters
#[must_use]
pub fn tolerant(token: &str) -> String {
    token
        .chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0u8; 4])))
        .collect::<Vec<_>>()
        .join(r"\s*")
}

/// Compile a case-insensitive pattern from the built-in pattern tables
///
/// # Panics
///
/// Panics if `source` is not a valid pattern. Only crate-internal constant
/// tables are compiled through here.
#[must_use]
pub fn compile(source: &str) -> Regex {
    match Regex::new(&format!("(?i){}", source)) {
        Ok(re) => re,
        Err(err) => panic!("invalid built-in pattern {:?}: {}", source, err),
    }
}
