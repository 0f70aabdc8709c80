//! Loose date parsing for draw headers
//!
//! Board pages mix weekday names, abbreviated months and several separators
//! (`2026-Jan-04 Sunday`, `04/01/2026`, `Thursday January 01, 2026`).

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static WEEKDAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(MONDAY|TUESDAY|WEDNESDAY|THURSDAY|FRIDAY|SATURDAY|SUNDAY)").unwrap()
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Tried in order, first full match wins
const FORMATS: [&str; 8] = [
    "%Y-%b-%d", "%Y-%m-%d", "%d-%b-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y",
    "%B %d, %Y",
];

/// Parse a draw date, or `None` when no known format matches
pub fn try_parse_date(text: &str) -> Option<NaiveDate> {
    let upper = text.trim().to_uppercase();
    let stripped = WEEKDAYS.replace_all(&upper, "");
    let cleaned = WHITESPACE.replace_all(stripped.trim(), " ");
    let cleaned = cleaned.trim_matches(|c: char| c == ',' || c.is_whitespace());

    if cleaned.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}

/// Parse a draw date, substituting the current local time when nothing matches.
///
/// The substitute is indistinguishable from a real "today" by value; use
/// [`try_parse_date`] when the difference matters.
pub fn parse_date(text: &str) -> NaiveDateTime {
    match try_parse_date(text) {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => {
            log::debug!("Unparseable draw date {:?}, using current time", text);
            Local::now().naive_local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(try_parse_date("2026-Jan-04"), ymd(2026, 1, 4));
        assert_eq!(try_parse_date("2026-01-04"), ymd(2026, 1, 4));
        assert_eq!(try_parse_date("04-Jan-2026"), ymd(2026, 1, 4));
        assert_eq!(try_parse_date("2026/01/04"), ymd(2026, 1, 4));
        assert_eq!(try_parse_date("04-01-2026"), ymd(2026, 1, 4));
    }

    #[test]
    fn test_day_month_wins_over_month_day() {
        assert_eq!(try_parse_date("03/01/2026"), ymd(2026, 1, 3));
        // Only month/day fits when the first field exceeds 12
        assert_eq!(try_parse_date("12/25/2025"), ymd(2025, 12, 25));
    }

    #[test]
    fn test_weekday_names_are_stripped() {
        assert_eq!(try_parse_date("2026-Jan-04 Sunday"), ymd(2026, 1, 4));
        assert_eq!(try_parse_date("sunday 2026-01-04"), ymd(2026, 1, 4));
        assert_eq!(
            try_parse_date("Thursday January 01, 2026"),
            ymd(2026, 1, 1)
        );
    }

    #[test]
    fn test_round_trip_same_calendar_date() {
        let a = parse_date("2026-Jan-04 Sunday");
        let b = parse_date("2026-01-04");
        assert_eq!(a.date(), b.date());
    }

    #[test]
    fn test_unparseable_defaults_to_now() {
        assert_eq!(try_parse_date("not a date"), None);
        assert_eq!(try_parse_date("   "), None);

        let before = Local::now().naive_local();
        let parsed = parse_date("not a date");
        let after = Local::now().naive_local();
        assert!(parsed >= before && parsed <= after);
    }
}
