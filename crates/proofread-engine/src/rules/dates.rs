//! Weekday/date consistency checks
//!
//! Recognizes "Weekday, Month Day" and "Month Day, Weekday" statements
//! (full or abbreviated months, optional ordinal suffix) and verifies the
//! weekday against every year in the caller's range. Two-day ranges such as
//! "Saturday & Sunday, May 16" are recognized as their own mention kind and
//! are not validated. In "May 16, Saturday & Sunday" only the weekday after
//! the conjunction is skipped; the one next to the date is still checked.

use std::collections::HashSet;

use chrono::Weekday;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use shared_types::{DateContext, ErrorKind, ErrorRecord};
use tracing::debug;

use crate::calendar::{WeekdayCalendar, MONTH_NAMES, WEEKDAY_NAMES};
use crate::patterns::{title_case, ClaimedSpans};

pub const DATE_LOCATION: &str = "Date check";

fn alternation(names: &[&str]) -> String {
    names.join("|")
}

lazy_static! {
    static ref WEEKDAY_ALT: String =
        alternation(&WEEKDAY_NAMES.iter().map(|(n, _)| *n).collect::<Vec<_>>());
    static ref MONTH_ALT: String =
        alternation(&MONTH_NAMES.iter().map(|(n, _)| *n).collect::<Vec<_>>());

    /// "Month Day" with optional period after an abbreviation and ordinal suffix
    static ref MONTH_DAY: String = format!(
        r"(?P<month>{})\.?\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b",
        *MONTH_ALT
    );

    static ref RANGE_WEEKDAY_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b(?:{wd})\s*(?:&|\band\b)\s*(?:{wd}),?\s+{md}",
        wd = *WEEKDAY_ALT,
        md = *MONTH_DAY
    ))
    .unwrap();

    static ref RANGE_MONTH_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b{md},?\s+(?P<weekday>{wd})\s*(?:&|\band\b)\s*(?:{wd})\b",
        wd = *WEEKDAY_ALT,
        md = *MONTH_DAY
    ))
    .unwrap();

    static ref WEEKDAY_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b(?P<weekday>{wd}),?\s+{md}",
        wd = *WEEKDAY_ALT,
        md = *MONTH_DAY
    ))
    .unwrap();

    static ref MONTH_FIRST: Regex = Regex::new(&format!(
        r"(?i)\b{md},?\s+(?P<weekday>{wd})\b",
        wd = *WEEKDAY_ALT,
        md = *MONTH_DAY
    ))
    .unwrap();
}

/// A weekday/date statement found in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateMention {
    /// A single weekday bound to a date
    Single {
        start: usize,
        end: usize,
        weekday: Weekday,
        /// Byte span of the weekday inside the phrase
        weekday_span: (usize, usize),
        month: u32,
        day: u32,
    },
    /// Two weekdays sharing one date
    DayRange { start: usize, end: usize },
}

impl DateMention {
    fn span(&self) -> (usize, usize) {
        match self {
            DateMention::Single { start, end, .. } | DateMention::DayRange { start, end } => {
                (*start, *end)
            }
        }
    }
}

/// Locate every weekday/date mention, ranges first, in reading order
pub fn find_date_mentions(text: &str) -> Vec<DateMention> {
    let mut claimed = ClaimedSpans::new();
    let mut mentions = Vec::new();

    for m in RANGE_WEEKDAY_FIRST.find_iter(text) {
        if claimed.overlaps(m.start(), m.end()) {
            continue;
        }
        claimed.claim(m.start(), m.end());
        mentions.push(DateMention::DayRange {
            start: m.start(),
            end: m.end(),
        });
    }

    for caps in RANGE_MONTH_FIRST.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if claimed.overlaps(whole.start(), whole.end()) {
            continue;
        }
        claimed.claim(whole.start(), whole.end());
        if let Some(mention) = leading_member(caps) {
            mentions.push(mention);
        }
    }

    let mut singles: Vec<DateMention> = [&*WEEKDAY_FIRST, &*MONTH_FIRST]
        .into_iter()
        .flat_map(|re| re.captures_iter(text).filter_map(single_mention))
        .collect();
    singles.sort_by_key(|m| m.span());

    for mention in singles {
        let (start, end) = mention.span();
        if claimed.overlaps(start, end) {
            continue;
        }
        claimed.claim(start, end);
        mentions.push(mention);
    }

    mentions.sort_by_key(|m| m.span());
    mentions
}

fn single_mention(caps: Captures<'_>) -> Option<DateMention> {
    let whole = caps.get(0)?;
    let weekday_match = caps.name("weekday")?;
    let weekday = WeekdayCalendar::parse_weekday(weekday_match.as_str())?;
    let month = WeekdayCalendar::parse_month(caps.name("month")?.as_str())?;
    let day = caps.name("day")?.as_str().parse::<u32>().ok()?;

    Some(DateMention::Single {
        start: whole.start(),
        end: whole.end(),
        weekday,
        weekday_span: (
            weekday_match.start() - whole.start(),
            weekday_match.end() - whole.start(),
        ),
        month,
        day,
    })
}

/// "May 16, Monday" out of "May 16, Monday & Tuesday"
fn leading_member(caps: Captures<'_>) -> Option<DateMention> {
    let weekday_end = caps.name("weekday")?.end();
    match single_mention(caps)? {
        DateMention::Single {
            start,
            weekday,
            weekday_span,
            month,
            day,
            ..
        } => Some(DateMention::Single {
            start,
            end: weekday_end,
            weekday,
            weekday_span,
            month,
            day,
        }),
        range => Some(range),
    }
}

/// Report weekday/date pairs that are wrong for every year in `years`
pub fn check_dates(text: &str, years: &DateContext) -> Vec<ErrorRecord> {
    let mut seen: HashSet<(Weekday, u32, u32)> = HashSet::new();
    let mut records = Vec::new();

    for mention in find_date_mentions(text) {
        let DateMention::Single {
            start,
            end,
            weekday,
            weekday_span,
            month,
            day,
        } = mention
        else {
            debug!("Skipping two-day range mention");
            continue;
        };

        if WeekdayCalendar::matches_in_range(years, month, day, weekday) {
            continue;
        }
        let Some((reference_year, actual)) = WeekdayCalendar::reference_weekday(years, month, day)
        else {
            debug!(month, day, "Date does not exist in any checked year");
            continue;
        };
        if !seen.insert((weekday, month, day)) {
            continue;
        }

        let phrase = &text[start..end];
        let (ws, we) = weekday_span;
        let stated = title_case(&phrase[ws..we]);
        let error_text = format!("{}{}{}", &phrase[..ws], stated, &phrase[we..]);
        let correction = format!(
            "{}{}{}",
            &phrase[..ws],
            WeekdayCalendar::weekday_name(actual),
            &phrase[we..]
        );

        let explanation = explain_mismatch(years, month, day, &stated, reference_year, actual);
        if let Some(record) = ErrorRecord::new(DATE_LOCATION, error_text, correction, ErrorKind::Date)
        {
            records.push(record.with_explanation(explanation));
        }
    }

    records
}

fn explain_mismatch(
    years: &DateContext,
    month: u32,
    day: u32,
    stated: &str,
    reference_year: i32,
    actual: Weekday,
) -> String {
    let month_name = WeekdayCalendar::month_name(month);
    let actual_name = WeekdayCalendar::weekday_name(actual);
    if years.is_single_year() {
        format!(
            "{} {}, {} falls on a {}, not a {}",
            month_name, day, reference_year, actual_name, stated
        )
    } else {
        format!(
            "{} {} is not a {} in any year checked ({}); in {} it falls on a {}",
            month_name, day, stated, years, reference_year, actual_name
        )
    }
}
