//! Shared utility functions for CRF crates.

/// Date and instant formatting helpers
pub mod dates {
    use chrono::{DateTime, NaiveDate, Utc};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_day(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_day(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Format a UTC instant for human-readable output: "YYYY-MM-DD HH:MM UTC"
    pub fn format_instant(instant: &DateTime<Utc>) -> String {
        instant.format("%Y-%m-%d %H:%M UTC").to_string()
    }

}
