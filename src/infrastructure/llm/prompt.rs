use crate::domain::Message;

/// Flatten an ordered history into the single-prompt shape both backends
/// consume: one `"role: content"` line per message, oldest first.
pub fn flatten_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
