//! Utility functions for timestamps, log previews, and file system checks.

use chrono::Local;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Timestamp format for `extraction_time` and `generated_at`.
pub const CAPTURE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format embedded in default output filenames.
pub const FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn capture_timestamp() -> String {
    Local::now().format(CAPTURE_FORMAT).to_string()
}

/// Default save name, e.g. `news_summaries_20250506_143000.json`.
pub fn default_output_filename() -> String {
    format!("news_summaries_{}.json", Local::now().format(FILENAME_FORMAT))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the dropped byte count appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
