//! Overlap distributor: spreads a task's share uniformly over its calendar span.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::time::days_between_inclusive;

/// Which increment field a distribution writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Planned,
    Actual,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive length; <= 0 for inverted spans.
    pub fn days(&self) -> i64 {
        days_between_inclusive(self.start, self.end)
    }

    pub fn is_valid(&self) -> bool {
        self.end >= self.start
    }

    /// Days shared with `[start, end]`, 0 when disjoint.
    pub fn overlap_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let lo = self.start.max(start);
        let hi = self.end.min(end);
        days_between_inclusive(lo, hi).max(0)
    }
}

/// Add `share_pct * overlap / span_days` to each bucket the span touches.
///
/// Buckets ending after `cutoff` receive nothing; that share is dropped, not
/// moved. Returns the total amount actually written.
pub fn distribute(
    span: DateSpan,
    share_pct: f64,
    buckets: &mut [Bucket],
    series: Series,
    cutoff: Option<NaiveDate>,
) -> f64 {
    let total_days = span.days();
    if total_days <= 0 || share_pct <= 0.0 || !share_pct.is_finite() {
        return 0.0;
    }

    // Buckets are chronological: skip straight to the first that can overlap.
    let first = buckets.partition_point(|b| b.end < span.start);
    let mut written = 0.0;

    for bucket in &mut buckets[first..] {
        if bucket.start > span.end {
            break;
        }
        if cutoff.is_some_and(|c| bucket.end > c) {
            continue;
        }
        let overlap = span.overlap_days(bucket.start, bucket.end);
        if overlap == 0 {
            continue;
        }
        let amount = share_pct * overlap as f64 / total_days as f64;
        match series {
            Series::Planned => bucket.planned_increment += amount,
            Series::Actual => bucket.actual_increment += amount,
        }
        written += amount;
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Granularity, generate_buckets};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn spreads_proportionally_to_overlap() {
        // Weeks: Jan 1-7, Jan 8-14.
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 14), Granularity::Week);
        // 10-day task: 7 days in week one, 3 in week two.
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 10));
        let written = distribute(span, 50.0, &mut buckets, Series::Planned, None);

        assert!((written - 50.0).abs() < 1e-9);
        assert!((buckets[0].planned_increment - 35.0).abs() < 1e-9);
        assert!((buckets[1].planned_increment - 15.0).abs() < 1e-9);
        assert_eq!(buckets[0].actual_increment, 0.0);
    }

    #[test]
    fn span_outside_window_drops_share() {
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 5), Granularity::Day);
        let span = DateSpan::new(d(2024, 1, 4), d(2024, 1, 7));
        let written = distribute(span, 40.0, &mut buckets, Series::Planned, None);
        // Only Jan 4 and Jan 5 fall inside the window: 2 of 4 days.
        assert!((written - 20.0).abs() < 1e-9);
        assert!((buckets[3].planned_increment - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cutoff_gates_later_buckets() {
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 4), Granularity::Day);
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 4));
        distribute(span, 100.0, &mut buckets, Series::Actual, Some(d(2024, 1, 2)));
        assert_eq!(buckets[0].actual_increment, 25.0);
        assert_eq!(buckets[1].actual_increment, 25.0);
        assert_eq!(buckets[2].actual_increment, 0.0);
        assert_eq!(buckets[3].actual_increment, 0.0);
    }

    #[test]
    fn inverted_span_contributes_nothing() {
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 4), Granularity::Day);
        let span = DateSpan::new(d(2024, 1, 3), d(2024, 1, 1));
        assert_eq!(distribute(span, 10.0, &mut buckets, Series::Planned, None), 0.0);
        assert!(buckets.iter().all(|b| b.planned_increment == 0.0));
    }
}
