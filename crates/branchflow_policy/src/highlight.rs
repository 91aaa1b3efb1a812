//! Keyword highlighting over sanitized text.

use crate::sanitize::Sanitizer;

/// CSS class of the inline highlight marker
pub const HIGHLIGHT_CLASS: &str = "csv-text-highlight";

/// Highlighter for a fixed word list
///
/// Words are applied longest first so that phrases win over their own
/// substrings. Each word is replaced over the whole text in turn; a later,
/// shorter word may still match inside the literal text of a marker an
/// earlier word inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighter {
    words: Vec<String>,
}

impl Highlighter {
    /// Create a highlighter; empty words are dropped
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.is_empty())
            .map(|w| w.replace('\n', "<br>"))
            .collect();
        // stable: equal lengths keep list order
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        Self { words }
    }

    /// Words in application order
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Check if there is nothing to highlight
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Wrap every literal, case-sensitive occurrence of each word
    #[must_use]
    pub fn highlight(&self, rendered: &str) -> String {
        let mut result = rendered.to_string();
        for word in &self.words {
            if result.contains(word.as_str()) {
                let marked = format!(r#"<span class="{}">{}</span>"#, HIGHLIGHT_CLASS, word);
                result = result.replace(word.as_str(), &marked);
            }
        }
        result
    }
}

/// Render an untrusted value as a markup fragment
///
/// Sanitizes, turns line breaks into `<br>` and applies highlighting.
#[must_use]
pub fn render_safe_html(sanitizer: &Sanitizer, text: &str, highlighter: &Highlighter) -> String {
    if text.is_empty() {
        return String::new();
    }
    let with_breaks = sanitizer.sanitize(text).replace('\n', "<br>");
    highlighter.highlight(&with_breaks)
}
