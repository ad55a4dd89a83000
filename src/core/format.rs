// ChiloDisco - core/format.rs
//
// Small display formatters for panel headers.

use crate::util::constants::NOT_AVAILABLE;
use chrono::{DateTime, FixedOffset, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable file size with one decimal above 1 KB.
///
/// Negative sizes are treated as unknown and shown as an em dash.
pub fn human_size(bytes: i64) -> String {
    if bytes < 0 {
        return NOT_AVAILABLE.to_string();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Local wall-clock rendering of a modification time.
pub fn format_mtime(mtime: Option<DateTime<Utc>>, tz: &FixedOffset) -> String {
    match mtime {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Last path segment of a server path, splitting on both `/` and `\`.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(1024 * 1024), "1.0 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0 GB");
        assert_eq!(human_size(-1), "\u{2014}");
    }

    #[test]
    fn test_human_size_caps_at_terabytes() {
        let pb = 1024_i64.pow(5);
        assert_eq!(human_size(pb), "1024.0 TB");
    }

    #[test]
    fn test_format_mtime_uses_zone() {
        let dt = DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_mtime(Some(dt), &plus_one), "2026-10-16 13:00:00");
        assert_eq!(format_mtime(None, &plus_one), "\u{2014}");
    }

    #[test]
    fn test_file_name_of_handles_both_separators() {
        assert_eq!(file_name_of("/var/log/fuzz/main.log"), "main.log");
        assert_eq!(file_name_of(r"C:\logs\parser.log"), "parser.log");
        assert_eq!(file_name_of("plain.log"), "plain.log");
        assert_eq!(file_name_of(""), "");
        assert_eq!(file_name_of("/var/log/"), "");
    }
}
