//! Parsers for the time fields of timetable exports.
//!
//! Timetables arrive as free text: `"1-6周,8周"` for weeks, `"星期三"` or
//! `"3"` for the weekday, `"第3节"` or `"3-5节"` for periods. The parsers
//! here are lenient: unparseable fragments are skipped and missing fields
//! come back as `None` or an empty set, which the conflict model treats as
//! "never conflicts".

use std::collections::BTreeSet;

use crate::models::TimeSlot;

const WEEK_MARK: char = '周';

const WEEKDAY_NAMES: [(&str, u8); 16] = [
    ("星期一", 1),
    ("周一", 1),
    ("星期二", 2),
    ("周二", 2),
    ("星期三", 3),
    ("周三", 3),
    ("星期四", 4),
    ("周四", 4),
    ("星期五", 5),
    ("周五", 5),
    ("星期六", 6),
    ("周六", 6),
    ("星期日", 7),
    ("星期天", 7),
    ("周日", 7),
    ("周天", 7),
];

const WEEKDAY_LABELS: [&str; 7] = [
    "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
];

/// Parses a week list such as `"1-6周,8周"` into `{1..=6, 8}`.
///
/// Accepts ASCII and full-width commas, swaps reversed ranges, and skips
/// fragments that are not numbers.
///
/// # Example
/// ```
/// use lab_schedule::parse::parse_weeks;
///
/// let weeks = parse_weeks("1-3周，8周");
/// assert_eq!(weeks.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 8]);
/// ```
pub fn parse_weeks(raw: &str) -> BTreeSet<u32> {
    let text: String = raw.trim().chars().filter(|&c| c != WEEK_MARK).collect();
    let mut weeks = BTreeSet::new();

    for part in text.split([',', '，']).map(str::trim) {
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>())
                else {
                    continue;
                };
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                weeks.extend(lo..=hi);
            }
            None => {
                if let Ok(week) = part.parse::<u32>() {
                    weeks.insert(week);
                }
            }
        }
    }

    weeks
}

/// Parses a weekday: digits `1..=7` or a Chinese day label.
pub fn parse_weekday(raw: &str) -> Option<u8> {
    let text = raw.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse::<u8>().ok().filter(|d| (1..=7).contains(d));
    }
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| *name == text)
        .map(|&(_, day)| day)
}

/// Parses a period field into an inclusive `(start, end)` range.
///
/// Takes the first and last integer in the text: `"第3节"` → `(3, 3)`,
/// `"3-5节"` → `(3, 5)`. Reversed ranges are swapped.
pub fn parse_period_range(raw: &str) -> Option<(u32, u32)> {
    let numbers: Vec<u32> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    match numbers.as_slice() {
        [] => None,
        [only] => Some((*only, *only)),
        [first, .., last] => Some((*first.min(last), *first.max(last))),
    }
}

/// Builds a slot, or `None` if there is no week data.
pub fn make_timeslot(
    weeks: BTreeSet<u32>,
    weekday: u8,
    start_period: u32,
    end_period: u32,
) -> Option<TimeSlot> {
    if weeks.is_empty() {
        return None;
    }
    Some(TimeSlot::new(weeks, weekday, start_period, end_period))
}

/// Parses the three text fields of a timetable row into a slot.
///
/// An unparseable weekday or period degrades to 0; missing weeks yield
/// `None`.
pub fn parse_timeslot(weeks: &str, weekday: &str, periods: &str) -> Option<TimeSlot> {
    let (start, end) = parse_period_range(periods).unwrap_or((0, 0));
    make_timeslot(
        parse_weeks(weeks),
        parse_weekday(weekday).unwrap_or(0),
        start,
        end,
    )
}

/// Display label for a weekday (`3` → `"星期三"`), or the number itself.
pub fn weekday_label(weekday: u8) -> String {
    match weekday {
        1..=7 => WEEKDAY_LABELS[usize::from(weekday - 1)].to_string(),
        other => other.to_string(),
    }
}

/// Display label for a week set (`{1, 2}` → `"1周，2周"`).
pub fn week_label(weeks: &BTreeSet<u32>) -> String {
    weeks
        .iter()
        .map(|w| format!("{w}{WEEK_MARK}"))
        .collect::<Vec<_>>()
        .join("，")
}
