use chrono::{Datelike, NaiveDate, Weekday};
use shared_types::DateContext;

/// Month names and abbreviations, longest spelling first so regex
/// alternation prefers "september" over "sept" over "sep"
pub const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("sept", 9),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

const MONTH_DISPLAY: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Weekday lookups for validating "Weekday, Month Day" statements
pub struct WeekdayCalendar;

impl WeekdayCalendar {
    /// Case-insensitive month lookup; accepts a trailing period ("Sept.")
    pub fn parse_month(name: &str) -> Option<u32> {
        let name = name.trim().trim_end_matches('.').to_lowercase();
        MONTH_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, m)| m)
    }

    pub fn parse_weekday(name: &str) -> Option<Weekday> {
        let name = name.trim().to_lowercase();
        WEEKDAY_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, w)| w)
    }

    pub fn weekday_name(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn month_name(month: u32) -> &'static str {
        month
            .checked_sub(1)
            .and_then(|i| MONTH_DISPLAY.get(i as usize))
            .copied()
            .unwrap_or("")
    }

    /// Actual weekday of a calendar date, `None` if the date does not exist
    pub fn weekday_of(year: i32, month: u32, day: u32) -> Option<Weekday> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday())
    }

    /// True if the date falls on `weekday` in at least one year of the range
    pub fn matches_in_range(years: &DateContext, month: u32, day: u32, weekday: Weekday) -> bool {
        years
            .years()
            .any(|year| Self::weekday_of(year, month, day) == Some(weekday))
    }

    /// The year and weekday to suggest in a correction: the range start when
    /// the date exists there, otherwise the first year where it does
    pub fn reference_weekday(years: &DateContext, month: u32, day: u32) -> Option<(i32, Weekday)> {
        years
            .years()
            .find_map(|year| Self::weekday_of(year, month, day).map(|w| (year, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_variants() {
        assert_eq!(WeekdayCalendar::parse_month("December"), Some(12));
        assert_eq!(WeekdayCalendar::parse_month("DEC"), Some(12));
        assert_eq!(WeekdayCalendar::parse_month("Sept."), Some(9));
        assert_eq!(WeekdayCalendar::parse_month("sep"), Some(9));
        assert_eq!(WeekdayCalendar::parse_month("Mayday"), None);
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(WeekdayCalendar::parse_weekday("wednesday"), Some(Weekday::Wed));
        assert_eq!(WeekdayCalendar::parse_weekday("SUNDAY"), Some(Weekday::Sun));
        assert_eq!(WeekdayCalendar::parse_weekday("Funday"), None);
    }

    #[test]
    fn test_month_name_round_trip() {
        for month in 1..=12 {
            let name = WeekdayCalendar::month_name(month);
            assert_eq!(WeekdayCalendar::parse_month(name), Some(month));
        }
    }

    #[test]
    fn test_weekday_of_known_dates() {
        assert_eq!(WeekdayCalendar::weekday_of(2025, 12, 31), Some(Weekday::Wed));
        assert_eq!(WeekdayCalendar::weekday_of(2024, 2, 29), Some(Weekday::Thu));
        assert_eq!(WeekdayCalendar::weekday_of(2025, 2, 29), None);
    }

    #[test]
    fn test_matches_in_range() {
        let years = DateContext::range(2024, 2025).unwrap();
        // March 5 is a Tuesday in 2024 and a Wednesday in 2025
        assert!(WeekdayCalendar::matches_in_range(&years, 3, 5, Weekday::Tue));
        assert!(WeekdayCalendar::matches_in_range(&years, 3, 5, Weekday::Wed));
        assert!(!WeekdayCalendar::matches_in_range(&years, 3, 5, Weekday::Fri));
    }

    #[test]
    fn test_reference_weekday_skips_missing_dates() {
        let years = DateContext::range(2023, 2025).unwrap();
        assert_eq!(
            WeekdayCalendar::reference_weekday(&years, 2, 29),
            Some((2024, Weekday::Thu))
        );
        assert_eq!(
            WeekdayCalendar::reference_weekday(&years, 1, 1),
            Some((2023, Weekday::Sun))
        );
        assert_eq!(WeekdayCalendar::reference_weekday(&years, 2, 30), None);
    }
}
