//! Shared formatting utilities for size display

/// Format bytes as human-readable size string
///
/// # Examples
///
/// ```
/// use pakdiff::fmt::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1_048_576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a signed byte delta with an explicit sign
///
/// # Examples
///
/// ```
/// use pakdiff::fmt::format_delta;
///
/// assert_eq!(format_delta(20), "+20 B");
/// assert_eq!(format_delta(-1536), "-1.50 KB");
/// assert_eq!(format_delta(0), "0 B");
/// ```
pub fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", format_bytes(delta as u64))
    } else if delta < 0 {
        format!("-{}", format_bytes(delta.unsigned_abs()))
    } else {
        "0 B".to_string()
    }
}
