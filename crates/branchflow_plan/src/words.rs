//! Highlight word list parsing.

use super::csv::tokenize;
use branchflow_policy::SafetyGate;

/// Parse a flat highlight word list
///
/// Every trimmed, non-empty field of every row is one word; a leading and
/// a trailing `"` are each removed. A payload the gate rejects yields no words.
#[must_use]
pub fn parse_highlight_words(gate: &SafetyGate, text: &str) -> Vec<String> {
    if !gate.is_safe(text) {
        tracing::error!("highlight word list rejected; highlighting disabled");
        return Vec::new();
    }

    tokenize(text)
        .iter()
        .flatten()
        .map(|field| field.trim())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let token = token.strip_prefix('"').unwrap_or(token);
            token.strip_suffix('"').unwrap_or(token)
        })
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        parse_highlight_words(&SafetyGate::new(), text)
    }

    #[test]
    fn test_flat_list() {
        assert_eq!(words("重要, 注意\n確認,,\n"), ["重要", "注意", "確認"]);
    }

    #[test]
    fn test_quoted_words() {
        assert_eq!(words("\"a, b\",c"), ["a, b", "c"]);
        // quotes left after tokenizing are stripped once
        assert_eq!(words("\"\"\"x\"\"\""), ["x"]);
    }

    #[test]
    fn test_lone_quote_pair_dropped() {
        assert_eq!(words("\"\"\"\"\"\",y"), ["y"]);
    }

    #[test]
    fn test_unpaired_quotes_stripped() {
        // a field holding a single `"` leaves nothing behind
        assert_eq!(words("\"\"\"\",y"), ["y"]);
        assert_eq!(words("\"\"\"\"abc,def\"\"\"\""), ["abc", "def"]);
    }

    #[test]
    fn test_rejected_list_is_empty() {
        assert!(words("ok,javascript:x").is_empty());
        assert!(words("").is_empty());
    }
}
