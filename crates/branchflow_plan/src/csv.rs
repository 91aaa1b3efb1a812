//! Quote-aware CSV tokenizer.
//!
//! A single left-to-right scan with one piece of state: whether the cursor
//! is inside quotes. Unbalanced quotes are not an error; the rest of the
//! input is simply read as quoted.

/// One line of the grid
pub type Row = Vec<String>;

/// Split raw text into rows of fields
#[must_use]
pub fn tokenize(text: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut field = String::new();
    let mut inside_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if inside_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            ',' if !inside_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !inside_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Render a row as one CSV line, every field quoted
///
/// Inverse of [`tokenize`] for a single row.
#[must_use]
pub fn render_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.as_ref().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
