const MAX_VISIBLE_LENGTH: usize = 100;

/// Sanitizes user-supplied message content for safe logging: collapse it to
/// one line and cap the visible length.
pub fn sanitize_content(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let single_line = trimmed.replace(['\r', '\n'], " ");
    let visible_end = single_line
        .char_indices()
        .nth(MAX_VISIBLE_LENGTH)
        .map(|(idx, _)| idx);

    match visible_end {
        Some(end) => format!(
            "{}... ({} chars total)",
            &single_line[..end],
            single_line.len()
        ),
        None => single_line,
    }
}
