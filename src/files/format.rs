//! Human-readable sizes and dates for the file list

use chrono::{DateTime, Utc};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Format a byte count: whole kilobytes below 1 MB, two decimals above.
/// The unit is picked on the rounded value, so nothing renders as `1024 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < KB {
        return format!("{} B", bytes);
    }

    let kb = (bytes as f64 / KB as f64).round();
    if kb < 1024.0 {
        return format!("{:.0} KB", kb);
    }

    let mb = bytes as f64 / MB as f64;
    if (mb * 100.0).round() / 100.0 < 1024.0 {
        return format!("{:.2} MB", mb);
    }

    format!("{:.2} GB", bytes as f64 / GB as f64)
}

pub fn format_last_modified(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}
