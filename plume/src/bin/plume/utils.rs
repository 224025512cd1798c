use chrono::{DateTime, Utc};

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Shortens `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    let flattened = text.replace('\n', " ");
    if flattened.chars().count() <= width {
        return flattened;
    }
    let kept: String = flattened.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
