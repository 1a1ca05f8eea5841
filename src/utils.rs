/// Collapse runs of whitespace to single spaces and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `limit` characters at the last word boundary and
/// append an ellipsis. Text within the limit is returned unchanged.
pub fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];
    let next_is_space = text[cut..].starts_with(char::is_whitespace);

    let kept = if next_is_space {
        head
    } else {
        // A single word longer than the limit has no boundary to cut at.
        head.rsplit_once(char::is_whitespace)
            .map(|(keep, _)| keep)
            .unwrap_or(head)
    };
    format!("{}…", kept.trim_end())
}

pub fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
