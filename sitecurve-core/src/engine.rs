//! Progress curve engine: tasks + window in, S-Curve buckets and KPIs out.
//!
//! Pure and stateless. Every call builds fresh buckets from the snapshot it is
//! given; nothing is cached between calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket::{Bucket, Granularity, bucket_count, generate_buckets};
use crate::curve::{build_actual, build_planned, resolve_actual_span};
use crate::error::{CurveError, DataQualityIssue, Result, SkippedTask};
use crate::rollup::leaf_tasks;
use crate::summary::{CurveKpis, aggregate, as_of_index, planned_span_days};
use crate::task::ProjectTask;
use crate::weighting::WeightingMode;

/// Upper bound on buckets per curve (about 55 years of daily buckets).
pub const MAX_BUCKETS: u64 = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveOptions {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub granularity: Granularity,
    pub weighting: WeightingMode,
    /// "Now": actual progress is never placed in buckets ending after this date.
    pub as_of: NaiveDate,
    /// Widen a valid window so trailing buckets reach the project end: plan
    /// ends, recorded actual ends, and resolved actual ends up to `as_of`.
    pub extend_to_project_end: bool,
}

impl CurveOptions {
    pub fn new(window_start: NaiveDate, window_end: NaiveDate, as_of: NaiveDate) -> Self {
        Self {
            window_start,
            window_end,
            granularity: Granularity::default(),
            weighting: WeightingMode::default(),
            as_of,
            extend_to_project_end: true,
        }
    }

    /// Window spanning the leaf tasks' plan ranges. `None` when no task has one.
    pub fn for_tasks(tasks: &[ProjectTask], as_of: NaiveDate) -> Option<Self> {
        let (start, end) = leaf_tasks(tasks)
            .into_iter()
            .filter_map(|t| t.plan_range())
            .filter(|(s, e)| e >= s)
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))?;
        Some(Self::new(start, end, as_of))
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_weighting(mut self, weighting: WeightingMode) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_extension(mut self, extend: bool) -> Self {
        self.extend_to_project_end = extend;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCurveResult {
    pub as_of: NaiveDate,
    pub buckets: Vec<Bucket>,
    pub kpis: CurveKpis,
    /// Tasks that were excluded, wholly or partly, for data-quality reasons.
    pub skipped: Vec<SkippedTask>,
}

impl ProgressCurveResult {
    /// Bucket containing `date`, if the curve covers it.
    pub fn bucket_at(&self, date: NaiveDate) -> Option<&Bucket> {
        let idx = self.buckets.partition_point(|b| b.end < date);
        self.buckets.get(idx).filter(|b| b.contains(date))
    }

    /// The bucket the KPIs were read from.
    pub fn as_of_bucket(&self) -> Option<&Bucket> {
        as_of_index(&self.buckets, self.as_of).map(|i| &self.buckets[i])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// True when a window from `options.window_start` to `end` stays within `MAX_BUCKETS`.
fn within_cap(options: &CurveOptions, end: NaiveDate) -> bool {
    bucket_count(options.window_start, end, options.granularity) <= MAX_BUCKETS
}

/// Window end widened to the last date the project is known to run to.
///
/// Recorded actual ends count as-is. A resolved actual end (complete as of
/// today, or estimated) counts only up to `as_of`, since later buckets never
/// receive actual progress. Ends past the bucket cap are not followed; when
/// the date came from the task record the task is reported.
fn extended_window_end(
    tasks: &[&ProjectTask],
    options: &CurveOptions,
    skipped: &mut Vec<SkippedTask>,
) -> NaiveDate {
    let mut window_end = options.window_end;

    for task in tasks {
        for end in [task.plan_end_date, task.actual_end_date].into_iter().flatten() {
            if end <= window_end {
                continue;
            }
            if within_cap(options, end) {
                window_end = end;
            } else {
                skipped.push(SkippedTask::new(&task.id, DataQualityIssue::ImplausibleDate));
            }
        }

        if let Some(actual) = resolve_actual_span(task, options.as_of) {
            let end = actual.span.end.min(options.as_of);
            if end > window_end && within_cap(options, end) {
                window_end = end;
            }
        }
    }

    window_end
}

/// Compute the S-Curve for a task snapshot.
///
/// Group tasks (those referenced as another task's parent) are ignored; their
/// children carry the scope. Tasks with unusable plan dates are left out of
/// the scope entirely and reported in `skipped`. An inverted window yields an
/// empty curve with zero KPIs.
///
/// Only a caller window needing more than `MAX_BUCKETS` buckets is an error.
/// When extending, a task whose plan end lies past that cap is dropped from
/// scope as `ImplausibleDate`, and a recorded actual end past it is reported
/// but not followed.
pub fn compute_progress_curve(
    tasks: &[ProjectTask],
    options: &CurveOptions,
) -> Result<ProgressCurveResult> {
    let count = bucket_count(options.window_start, options.window_end, options.granularity);
    if count > MAX_BUCKETS {
        return Err(CurveError::invalid(format!(
            "window {}..{} needs {count} {} buckets (max {MAX_BUCKETS})",
            options.window_start, options.window_end, options.granularity
        )));
    }

    let extend = options.extend_to_project_end && options.window_end >= options.window_start;
    let mut skipped = Vec::new();
    let mut eligible: Vec<&ProjectTask> = Vec::new();

    for task in leaf_tasks(tasks) {
        match task.plan_range() {
            None => skipped.push(SkippedTask::new(&task.id, DataQualityIssue::MissingPlanDates)),
            Some((s, e)) if e < s => {
                skipped.push(SkippedTask::new(&task.id, DataQualityIssue::InvertedPlanRange))
            }
            Some((_, e)) if extend && !within_cap(options, e) => {
                skipped.push(SkippedTask::new(&task.id, DataQualityIssue::ImplausibleDate))
            }
            Some(_) => eligible.push(task),
        }
    }

    let window_end = if extend {
        extended_window_end(&eligible, options, &mut skipped)
    } else {
        options.window_end
    };

    let mut buckets = generate_buckets(options.window_start, window_end, options.granularity);

    skipped.extend(build_planned(&eligible, &mut buckets, options.weighting));
    skipped.extend(build_actual(
        &eligible,
        &mut buckets,
        options.weighting,
        options.as_of,
    ));

    let kpis = aggregate(&mut buckets, options.as_of, planned_span_days(&eligible));

    Ok(ProgressCurveResult {
        as_of: options.as_of,
        buckets,
        kpis,
        skipped,
    })
}
