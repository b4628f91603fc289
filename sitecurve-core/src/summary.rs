//! Cumulative aggregation and headline KPIs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::task::ProjectTask;
use crate::time::days_between_inclusive;

/// Headline numbers shown above the S-Curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveKpis {
    /// Cumulative planned percent as of today.
    pub current_planned: f64,
    /// Cumulative actual percent (earned) as of today.
    pub current_actual: f64,
    /// `current_actual - current_planned`; negative means behind schedule.
    pub variance: f64,
    /// Variance expressed in schedule days.
    pub variance_days: Option<i64>,
    /// Earned over planned; `None` while nothing was planned yet.
    pub schedule_performance_index: Option<f64>,
}

/// Running sums of the increments, clamped to [0, 100].
pub fn accumulate(buckets: &mut [Bucket]) {
    let mut planned = 0.0_f64;
    let mut actual = 0.0_f64;
    for b in buckets.iter_mut() {
        planned = (planned + b.planned_increment).clamp(0.0, 100.0);
        actual = (actual + b.actual_increment).clamp(0.0, 100.0);
        b.cumulative_planned = planned;
        b.cumulative_actual = actual;
    }
}

/// Index of the bucket that represents "now": the last one ending on or
/// before `as_of`, else the first bucket. `None` for an empty curve.
pub fn as_of_index(buckets: &[Bucket], as_of: NaiveDate) -> Option<usize> {
    if buckets.is_empty() {
        return None;
    }
    let elapsed = buckets.partition_point(|b| b.end <= as_of);
    Some(elapsed.saturating_sub(1))
}

/// Inclusive days from the earliest plan start to the latest plan end,
/// considering only tasks with a valid plan range.
pub fn planned_span_days(tasks: &[&ProjectTask]) -> Option<i64> {
    let mut ranges = tasks
        .iter()
        .filter_map(|t| t.plan_range())
        .filter(|(s, e)| e >= s);
    let (mut lo, mut hi) = ranges.next()?;
    for (s, e) in ranges {
        lo = lo.min(s);
        hi = hi.max(e);
    }
    Some(days_between_inclusive(lo, hi))
}

/// KPIs read off already-accumulated buckets.
pub fn summarize(buckets: &[Bucket], as_of: NaiveDate, span_days: Option<i64>) -> CurveKpis {
    let Some(idx) = as_of_index(buckets, as_of) else {
        return CurveKpis {
            variance_days: span_days.map(|_| 0),
            ..CurveKpis::default()
        };
    };

    let current_planned = buckets[idx].cumulative_planned;
    let current_actual = buckets[idx].cumulative_actual;
    let variance = current_actual - current_planned;

    CurveKpis {
        current_planned,
        current_actual,
        variance,
        variance_days: span_days.map(|days| (variance / 100.0 * days as f64).round() as i64),
        schedule_performance_index: (current_planned > 0.0)
            .then(|| current_actual / current_planned),
    }
}

/// Accumulate in place, then summarize.
pub fn aggregate(buckets: &mut [Bucket], as_of: NaiveDate, span_days: Option<i64>) -> CurveKpis {
    accumulate(buckets);
    summarize(buckets, as_of, span_days)
}
