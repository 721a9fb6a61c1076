use serde_json::Value;

/// Pretty-prints embedded JSON.
///
/// Text that is not wrapped in `{…}` or `[…]` is returned untouched. Text that
/// looks like JSON but fails to parse is returned trimmed. Never fails.
pub fn format_json(text: &str) -> String {
    let trimmed = text.trim();
    if !looks_like_json(trimmed) {
        return text.to_string();
    }

    serde_json::from_str::<Value>(trimmed)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| trimmed.to_string())
}

fn looks_like_json(trimmed: &str) -> bool {
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}
