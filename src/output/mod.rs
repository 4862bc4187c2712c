//! Terminal output: status lines, JSON, tables and page headers.
//!
//! Colors and decorations are only used when stdout is a terminal; piped
//! output stays plain so it can be consumed by other tools.

pub mod page;
pub mod table;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::IsTerminal;

pub use page::{breadcrumb, print_page, render_header};
pub use table::Table;

/// Width tables are fitted into
pub const MAX_TABLE_WIDTH: usize = 120;

pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    println!("{json}");
    Ok(())
}

/// Category label for search results
pub fn format_type(category: &str) -> String {
    match category {
        "page" => "📄 page".to_string(),
        "database" => "🗃️  db".to_string(),
        other => other.to_string(),
    }
}

/// Human-friendly age of an RFC 3339 timestamp relative to `now`.
/// Unparseable input is shown as-is.
pub fn format_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(time) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let time = time.with_timezone(&Utc);
    let diff = now.signed_duration_since(time);

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        plural(diff.num_minutes(), "minute")
    } else if diff.num_days() < 1 {
        plural(diff.num_hours(), "hour")
    } else if diff.num_days() == 1 {
        "yesterday".to_string()
    } else if diff.num_days() < 7 {
        format!("{} days ago", diff.num_days())
    } else {
        time.format("%-d %b %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let ago = |d: Duration| (now - d).to_rfc3339();

        assert_eq!(format_time(&ago(Duration::seconds(10)), now), "just now");
        assert_eq!(format_time(&ago(Duration::minutes(1)), now), "1 minute ago");
        assert_eq!(format_time(&ago(Duration::minutes(42)), now), "42 minutes ago");
        assert_eq!(format_time(&ago(Duration::hours(3)), now), "3 hours ago");
        assert_eq!(format_time(&ago(Duration::hours(30)), now), "yesterday");
        assert_eq!(format_time(&ago(Duration::days(4)), now), "4 days ago");
        assert_eq!(format_time("2024-01-05T08:00:00Z", now), "5 Jan 2024");
        assert_eq!(format_time("last tuesday", now), "last tuesday");
    }

    #[test]
    fn test_format_type() {
        assert_eq!(format_type("page"), "📄 page");
        assert_eq!(format_type("database"), "🗃️  db");
        assert_eq!(format_type("user"), "user");
    }
}
