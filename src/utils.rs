//! Utility functions for logging, file naming and file system checks.
//!
//! - String truncation for log previews (char-boundary safe for CJK text)
//! - Timestamped, filesystem-safe output file names
//! - Output directory validation

use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Scratch file created by [`ensure_writable_dir`].
const WRITE_TEST_FILE: &str = ".edu_news_write_test";

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters (not bytes, so multi-byte
/// headlines never split mid-character) with an ellipsis and the number of
/// dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("全國運動會開幕", 3), "全國運…(+4 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => {
            let dropped = s[cut..].chars().count();
            format!("{}…(+{} chars)", &s[..cut], dropped)
        }
    }
}

/// Make a unit name safe to embed in a file name.
///
/// Path separators and characters reserved on common filesystems become `_`;
/// CJK and other letters are kept as-is.
pub fn sanitize_for_filename(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "unit".to_string()
    } else {
        cleaned
    }
}

/// Output file name: `{prefix}_news_{YYYYmmdd_HHMMSS}.json`.
pub fn output_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_news_{}.json",
        sanitize_for_filename(prefix),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a small
/// marker file. A marker that cannot be removed is logged, not fatal.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let marker = write_test_path(path);
    fs::write(&marker, b"").await?;
    if let Err(e) = fs::remove_file(&marker).await {
        warn!(marker = %marker.display(), error = %e, "Could not remove write-test file");
    }
    info!("Output directory is writable");
    Ok(())
}

fn write_test_path(dir: &str) -> PathBuf {
    Path::new(dir).join(WRITE_TEST_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
        assert_eq!(truncate_for_log("abc", 3), "abc");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_truncate_for_log_cjk() {
        assert_eq!(truncate_for_log("全國運動會開幕", 3), "全國運…(+4 chars)");
    }

    #[test]
    fn test_sanitize_for_filename() {
        assert_eq!(sanitize_for_filename("體育署"), "體育署");
        assert_eq!(sanitize_for_filename("K-12/國教"), "K-12_國教");
        assert_eq!(sanitize_for_filename(" Youth Office "), "Youth_Office");
        assert_eq!(sanitize_for_filename("   "), "unit");
    }

    #[test]
    fn test_output_file_name() {
        let at = Local.with_ymd_and_hms(2025, 8, 14, 9, 5, 7).unwrap();
        assert_eq!(
            output_file_name("體育署", at),
            "體育署_news_20250814_090507.json"
        );
        assert_eq!(
            output_file_name("test_sports", at),
            "test_sports_news_20250814_090507.json"
        );
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!("edu_news_out_{}", std::process::id()));
        let path = dir.join("nested");
        let path = path.to_str().unwrap();

        ensure_writable_dir(path).await.unwrap();
        assert!(Path::new(path).is_dir());
        assert!(!write_test_path(path).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
