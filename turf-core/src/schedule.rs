//! Turning customer-entered dates and hour ranges into slot identifiers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use turf_shared::{SlotLabel, SlotParseError};

use crate::BookingError;

/// Hours in a day; an end of `HOURS_PER_DAY` means midnight ending the day.
const HOURS_PER_DAY: u32 = 24;

/// The hourly slots between a start label (inclusive) and an end label
/// (exclusive).
///
/// An end of "12 AM" means midnight at the end of the day. Any other end at or
/// before the start wraps into the next day; equal labels give an empty range.
/// Slots past midnight keep their hour label on the same date.
///
/// A single range therefore spans at most 23 hours. A whole day has to be
/// entered as two ranges, e.g. "12 AM" to "11 PM" and "11 PM" to "12 AM".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    start: u32,
    end: u32,
}

impl SlotRange {
    pub fn new(from: SlotLabel, to: SlotLabel) -> Self {
        let start = from.hour();
        let end = match to.hour() {
            h if h == start => start,
            0 => HOURS_PER_DAY,
            h if h < start => h + HOURS_PER_DAY,
            h => h,
        };
        Self { start, end }
    }

    pub fn parse(from: &str, to: &str) -> Result<Self, SlotParseError> {
        Ok(Self::new(from.parse()?, to.parse()?))
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slots in ascending time order. Each call starts from the beginning.
    pub fn iter(&self) -> impl Iterator<Item = SlotLabel> + Clone {
        (self.start..self.end).filter_map(|h| SlotLabel::from_hour(h % HOURS_PER_DAY))
    }

    pub fn labels(&self) -> Vec<SlotLabel> {
        self.iter().collect()
    }
}

/// Expands a `from`/`to` pair into its slots, or `InvalidTimeFormat`.
pub fn expand(from: &str, to: &str) -> Result<Vec<SlotLabel>, BookingError> {
    SlotRange::parse(from, to)
        .map(|range| range.labels())
        .map_err(|e| BookingError::InvalidTimeFormat(e.to_string()))
}

/// Accepts `YYYY-MM-DD`, or a full ISO-8601 timestamp of which only the
/// calendar date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| BookingError::InvalidDate(raw.to_string()))
}

/// Parses explicit labels and orders them by hour, dropping duplicates.
pub fn parse_labels<S: AsRef<str>>(times: &[S]) -> Result<Vec<SlotLabel>, BookingError> {
    let mut labels = times
        .iter()
        .map(|t| t.as_ref().parse::<SlotLabel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BookingError::InvalidTimeFormat(e.to_string()))?;
    labels.sort();
    labels.dedup();
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(from: &str, to: &str) -> Vec<String> {
        expand(from, to).unwrap().iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_afternoon_range() {
        assert_eq!(names("2 PM", "5 PM"), vec!["2 PM", "3 PM", "4 PM"]);
        assert_eq!(names("02 PM", "05 PM"), vec!["2 PM", "3 PM", "4 PM"]);
    }

    #[test]
    fn test_end_of_day_sentinel() {
        assert_eq!(names("10 PM", "12 AM"), vec!["10 PM", "11 PM"]);
        assert_eq!(names("11 AM", "12 AM").len(), 13);
    }

    #[test]
    fn test_wraps_past_midnight() {
        assert_eq!(names("11 PM", "1 AM"), vec!["11 PM", "12 AM"]);
        assert_eq!(names("9 PM", "2 AM"), vec!["9 PM", "10 PM", "11 PM", "12 AM", "1 AM"]);
    }

    #[test]
    fn test_noon_boundaries() {
        assert_eq!(names("11 AM", "1 PM"), vec!["11 AM", "12 PM"]);
        assert_eq!(names("12 AM", "2 AM"), vec!["12 AM", "1 AM"]);
    }

    #[test]
    fn test_equal_labels_are_empty() {
        assert!(expand("3 PM", "3 PM").unwrap().is_empty());
        assert!(expand("03 PM", "3 PM").unwrap().is_empty());
        assert!(expand("12 AM", "12 AM").unwrap().is_empty());
    }

    #[test]
    fn test_whole_day_takes_two_ranges() {
        let mut day = expand("12 AM", "11 PM").unwrap();
        assert_eq!(day.len(), 23);
        day.extend(expand("11 PM", "12 AM").unwrap());
        let hours: Vec<u32> = day.iter().map(|l| l.hour()).collect();
        assert_eq!(hours, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_length_matches_hour_difference() {
        for from in 0..24 {
            for to in 0..24 {
                let range = SlotRange::new(
                    SlotLabel::from_hour(from).unwrap(),
                    SlotLabel::from_hour(to).unwrap(),
                );
                let expected = if from == to { 0 } else { (to + 24 - from) % 24 };
                assert_eq!(range.len(), expected as usize, "{from} -> {to}");
                assert_eq!(range.iter().count(), range.len());
                assert_eq!(range.labels(), range.labels());
            }
        }
    }

    #[test]
    fn test_invalid_labels() {
        assert!(matches!(expand("2:00 PM", "5 PM"), Err(BookingError::InvalidTimeFormat(_))));
        assert!(matches!(expand("2 PM", "17"), Err(BookingError::InvalidTimeFormat(_))));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 24).unwrap();
        assert_eq!(parse_date("2025-06-24").unwrap(), expected);
        assert_eq!(parse_date("2025-06-24T00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2025-06-24T18:30:00+05:30").unwrap(), expected);
        assert!(matches!(parse_date("24th June"), Err(BookingError::InvalidDate(_))));
        assert!(matches!(parse_date("2025-02-30"), Err(BookingError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_labels_sorts_and_dedups() {
        let labels = parse_labels(&["4 PM", "3 PM", "04 PM"]).unwrap();
        let rendered: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered, vec!["3 PM", "4 PM"]);
    }
}
