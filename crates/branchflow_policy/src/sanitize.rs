//! Sanitizer for untrusted field values.
//!
//! Values are entity-decoded until a fixed point is reached (bounded depth),
//! then HTML-escaped, then stripped of script-ish constructs. The result is
//! safe to place inside markup: it never contains a raw `<` or `>`.

use crate::pattern::{ASCII_WORD, compile, tolerant};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

static HEX_REFERENCE: Lazy<Regex> = Lazy::new(|| compile("&#x([0-9a-f]+);"));

static DECIMAL_REFERENCE: Lazy<Regex> = Lazy::new(|| compile("&#([0-9]+);"));

static SCRIPT_TOKENS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        "javascript:",
        "data:",
        "vbscript:",
        "expression:",
        "eval(",
        "prompt(",
        "alert(",
    ]
    .iter()
    .map(|token| compile(&tolerant(token)))
    .collect()
});

static HANDLERS_AND_CSS_URLS: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"o\s*n\s*{w}+\s*=|{w}+\s*:\s*{url}",
        w = ASCII_WORD,
        url = tolerant("url(")
    ))
});

fn char_from_code(code: Option<u32>) -> char {
    code.and_then(char::from_u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Decode one layer of HTML character references
///
/// Replacements run in sequence over the whole string, so `&amp;lt;`
/// collapses to `<` in a single call. Numeric references that do not name a
/// Unicode scalar value decode to U+FFFD.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let named = input
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'");

    let hex = HEX_REFERENCE.replace_all(&named, |caps: &Captures<'_>| {
        char_from_code(u32::from_str_radix(&caps[1], 16).ok()).to_string()
    });

    DECIMAL_REFERENCE
        .replace_all(&hex, |caps: &Captures<'_>| {
            char_from_code(caps[1].parse::<u32>().ok()).to_string()
        })
        .into_owned()
}

/// Escape the five HTML metacharacters
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn strip_script_constructs(escaped: String) -> String {
    let mut text = escaped;
    for re in SCRIPT_TOKENS.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    HANDLERS_AND_CSS_URLS.replace_all(&text, "").into_owned()
}

/// Recursive-decode sanitizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sanitizer {
    /// Decode levels tolerated before the input is treated as hostile
    pub max_depth: usize,
}

impl Sanitizer {
    /// Default decode depth bound
    pub const DEFAULT_MAX_DEPTH: usize = 5;

    /// Create a sanitizer with the default depth bound
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the decode depth bound
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sanitize a value that may be absent
    #[must_use]
    pub fn sanitize_opt(&self, input: Option<&str>) -> String {
        input.map(|s| self.sanitize(s)).unwrap_or_default()
    }

    /// Sanitize an untrusted value into markup-safe text
    ///
    /// Returns an empty string when the value is still changing after
    /// `max_depth` decode levels.
    #[must_use]
    pub fn sanitize(&self, input: &str) -> String {
        let mut current = Cow::Borrowed(input);
        let mut depth = 0;

        loop {
            if depth >= self.max_depth {
                tracing::warn!(
                    depth,
                    "decode depth exhausted; input may be layered obfuscation"
                );
                return String::new();
            }
            let decoded = decode_entities(&current);
            if decoded == *current {
                break;
            }
            current = Cow::Owned(decoded);
            depth += 1;
        }

        strip_script_constructs(escape_html(&current))
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(input: &str) -> String {
        Sanitizer::new().sanitize(input)
    }

    #[test]
    fn test_decode_named() {
        assert_eq!(
            decode_entities("&lt;b&gt; &quot;x&quot; &#039;y&#39;"),
            "<b> \"x\" 'y'"
        );
    }

    #[test]
    fn test_decode_is_sequential() {
        assert_eq!(decode_entities("&amp;lt;"), "<");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode_entities("&#x3c;&#X3E;&#60;"), "<><");
        assert_eq!(decode_entities("&#12354;"), "あ");
    }

    #[test]
    fn test_decode_invalid_scalar() {
        assert_eq!(decode_entities("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#99999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize("はい、次へ進みます"), "はい、次へ進みます");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_opt_none() {
        assert_eq!(Sanitizer::new().sanitize_opt(None), "");
        assert_eq!(Sanitizer::new().sanitize_opt(Some("a<b")), "a&lt;b");
    }

    #[test]
    fn test_encoded_tags_are_escaped() {
        assert_eq!(sanitize("&lt;b&gt;bold"), "&lt;b&gt;bold");
        assert_eq!(sanitize("&#x3c;i&#x3e;"), "&lt;i&gt;");
    }

    #[test]
    fn test_script_tokens_stripped() {
        assert_eq!(sanitize("click javascript:go"), "click go");
        assert_eq!(sanitize("J A V A S C R I P T : x"), " x");
        assert_eq!(sanitize("alert(1)"), "1)");
        assert_eq!(sanitize("vbscript:run expression:y"), "run y");
    }

    #[test]
    fn test_handlers_stripped() {
        assert_eq!(sanitize("<img onerror=x>"), "&lt;img x&gt;");
        assert_eq!(sanitize("background:url(a)"), "a)");
    }

    #[test]
    fn test_depth_bound_fails_safe() {
        let sanitizer = Sanitizer::new().with_max_depth(2);
        // needs three decode levels: &#38;#38;#60; -> &#38;#60; -> &#60; -> <
        assert_eq!(sanitizer.sanitize("&#38;#38;#60;"), "");
        assert_eq!(sanitizer.sanitize("&#38;#60;"), "");
        assert_eq!(sanitizer.sanitize("&#60;"), "&lt;");
    }

    #[test]
    fn test_layered_encodings_decoded_then_escaped() {
        assert_eq!(sanitize("&amp;amp;lt;script&gt;"), "&lt;script&gt;");
        assert_eq!(sanitize("&#x6a;avascript:alert(1)"), "1)");
        assert_eq!(sanitize("&amp;#106;ava&#X53;cript&#58;go"), "go");
    }

    #[test]
    fn test_zero_depth_rejects_everything() {
        assert_eq!(Sanitizer::new().with_max_depth(0).sanitize("abc"), "");
    }
}
