pub trait StripCodeBlock {
    fn strip_code_block(&self) -> &str;
}

impl StripCodeBlock for str {
    fn strip_code_block(&self) -> &str {
        let trimmed = self.trim();
        if trimmed.starts_with("```")
            && let Some(pos) = trimmed.find('\n')
        {
            let inner = &trimmed[pos + 1 ..];
            if let Some(inner) = inner.strip_suffix("```") {
                return inner.trim();
            }
        }
        trimmed
    }
}

/// Truncate `text` to at most `limit` characters, marking the cut inline
/// so a reader (human or model) knows data was dropped.
pub fn truncate_marked(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}... [truncated]")
}
