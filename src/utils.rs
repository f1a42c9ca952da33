use unicode_width::UnicodeWidthChar;

/// Shortens `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Visual (line, column) just after the last character of `text` when it is
/// broken at explicit newlines and hard-wrapped at `max_width` columns.
pub fn end_cursor_position(text: &str, max_width: usize) -> (usize, usize) {
    let max_width = max_width.max(1);
    let mut line = 0;
    let mut col = 0;

    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            col = 0;
            continue;
        }
        let width = ch.width().unwrap_or(0);
        if col + width > max_width && col > 0 {
            line += 1;
            col = 0;
        }
        col += width;
    }

    (line, col)
}

/// Number of visual lines `text` occupies at `max_width` columns.
pub fn estimate_line_count(text: &str, max_width: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    let (line, col) = end_cursor_position(text, max_width);
    if col == 0 && text.ends_with('\n') {
        line
    } else {
        line + 1
    }
}
