//! Single-line truncation for audit display.
//!
//! Audit lines are read in a chat client, so multi-line content is folded
//! onto one logical line with a visible break marker before it is cut.

/// Replaces each run of line breaks.
pub const LINE_BREAK_MARKER: &str = " ↵ ";

/// Appended when text is cut.
pub const ELLIPSIS: char = '…';

/// Trim `text`, fold line breaks into [`LINE_BREAK_MARKER`], and cut to
/// `limit` characters plus [`ELLIPSIS`] when longer.
///
/// The result never contains `\n` or `\r`, and `truncate(truncate(s, n), n)`
/// equals `truncate(s, n)`.
pub fn truncate(text: &str, limit: usize) -> String {
    let folded = fold_line_breaks(text.trim());
    match folded.char_indices().nth(limit) {
        Some((idx, _)) => {
            let mut cut = folded[..idx].to_string();
            cut.push(ELLIPSIS);
            cut
        }
        None => folded,
    }
}

/// First `n` characters of `text`, without an ellipsis.
pub fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn fold_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                out.push_str(LINE_BREAK_MARKER);
                in_break = true;
            }
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}
