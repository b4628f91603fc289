//! Bucket generator: partitions a date window into day/week/month slices.
//!
//! Buckets are inclusive on both ends, contiguous and chronological. Week
//! buckets start on Monday; month buckets on the 1st.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity '{other}' (expected day|week|month)")),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => f.write_str("day"),
            Granularity::Week => f.write_str("week"),
            Granularity::Month => f.write_str("month"),
        }
    }
}

/// One time slice of the curve. Increments and cumulatives are percent of total scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub planned_increment: f64,
    pub actual_increment: f64,
    pub cumulative_planned: f64,
    pub cumulative_actual: f64,
}

impl Bucket {
    pub fn new(start: NaiveDate, end: NaiveDate, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            planned_increment: 0.0,
            actual_increment: 0.0,
            cumulative_planned: 0.0,
            cumulative_actual: 0.0,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// First bucket start for a window: the day itself, its Monday, or the 1st of its month.
fn align_start(date: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => Some(date),
        Granularity::Week => {
            let back = date.weekday().num_days_from_monday() as u64;
            date.checked_sub_days(Days::new(back))
        }
        Granularity::Month => date.with_day(1),
    }
}

/// Last day of the period that begins at an aligned `start`.
fn period_end(start: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => Some(start),
        Granularity::Week => start.checked_add_days(Days::new(6)),
        Granularity::Month => start.checked_add_months(Months::new(1))?.pred_opt(),
    }
}

fn label_for(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => start.format("%Y-%m-%d").to_string(),
        Granularity::Week => start.format("Wk %Y-%m-%d").to_string(),
        Granularity::Month => start.format("%b %Y").to_string(),
    }
}

/// Number of buckets `generate_buckets` would return, without allocating them.
pub fn bucket_count(window_start: NaiveDate, window_end: NaiveDate, granularity: Granularity) -> u64 {
    if window_end < window_start {
        return 0;
    }
    let Some(first) = align_start(window_start, granularity) else {
        return 0;
    };
    let span = (window_end - first).num_days().max(0) as u64;
    match granularity {
        Granularity::Day => span + 1,
        Granularity::Week => span / 7 + 1,
        Granularity::Month => {
            let months = |d: NaiveDate| d.year() as i64 * 12 + d.month0() as i64;
            (months(window_end) - months(first)).max(0) as u64 + 1
        }
    }
}

/// Partition `[window_start, window_end]` into buckets.
///
/// An inverted window yields no buckets. Generation stops as soon as a bucket
/// would start after `window_end`, or when date arithmetic runs out of range.
pub fn generate_buckets(
    window_start: NaiveDate,
    window_end: NaiveDate,
    granularity: Granularity,
) -> Vec<Bucket> {
    let mut out = Vec::new();
    if window_end < window_start {
        return out;
    }
    let Some(mut start) = align_start(window_start, granularity) else {
        return out;
    };

    while start <= window_end {
        let Some(end) = period_end(start, granularity) else { break };
        out.push(Bucket::new(start, end, label_for(start, granularity)));
        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_buckets_cover_window() {
        let b = generate_buckets(d(2024, 1, 1), d(2024, 1, 10), Granularity::Day);
        assert_eq!(b.len(), 10);
        assert_eq!(b[0].start, d(2024, 1, 1));
        assert_eq!(b[9].end, d(2024, 1, 10));
        assert_eq!(b[3].label, "2024-01-04");
    }

    #[test]
    fn weekly_buckets_align_to_monday() {
        // 2024-01-03 is a Wednesday; its Monday is Jan 1.
        let b = generate_buckets(d(2024, 1, 3), d(2024, 1, 20), Granularity::Week);
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].start, d(2024, 1, 1));
        assert_eq!(b[0].end, d(2024, 1, 7));
        assert_eq!(b[2].start, d(2024, 1, 15));
        assert_eq!(b[2].end, d(2024, 1, 21));
        assert_eq!(b[1].label, "Wk 2024-01-08");
    }

    #[test]
    fn monthly_buckets_follow_calendar() {
        let b = generate_buckets(d(2024, 1, 15), d(2024, 3, 2), Granularity::Month);
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].start, d(2024, 1, 1));
        assert_eq!(b[0].end, d(2024, 1, 31));
        // Leap year February.
        assert_eq!(b[1].end, d(2024, 2, 29));
        assert_eq!(b[2].label, "Mar 2024");
    }

    #[test]
    fn buckets_are_contiguous() {
        for g in [Granularity::Day, Granularity::Week, Granularity::Month] {
            let b = generate_buckets(d(2023, 11, 20), d(2024, 2, 10), g);
            for w in b.windows(2) {
                assert_eq!(w[0].end.succ_opt().unwrap(), w[1].start, "{g}");
            }
            assert_eq!(b.len() as u64, bucket_count(d(2023, 11, 20), d(2024, 2, 10), g));
        }
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(generate_buckets(d(2024, 2, 1), d(2024, 1, 1), Granularity::Day).is_empty());
        assert_eq!(bucket_count(d(2024, 2, 1), d(2024, 1, 1), Granularity::Week), 0);
    }

    #[test]
    fn parse_granularity() {
        assert_eq!("Monthly".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("quarter".parse::<Granularity>().is_err());
    }
}
