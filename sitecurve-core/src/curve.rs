//! Planned and actual curve builders.
//!
//! Both builders fill bucket increments in percent of total scope. Total scope
//! counts only tasks with a usable plan range, so a task missing plan dates
//! never holds back the planned curve under cost weighting. Callers should
//! pass the same task set to both builders.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::distribute::{DateSpan, Series, distribute};
use crate::error::{DataQualityIssue, SkippedTask};
use crate::task::ProjectTask;
use crate::weighting::{WeightingMode, total_scope, weight_fraction};

/// Where the resolved actual end date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActualEndSource {
    /// `actualEndDate` recorded on the task.
    Recorded,
    /// Complete task without an end date: assumed finished as of today.
    AsOf,
    /// In-progress task: linear estimate from percent complete.
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActualSpan {
    pub span: DateSpan,
    pub end_source: ActualEndSource,
}

/// Linear end estimate: `start + round(plan_days * progress / 100) - 1`.
///
/// At least one elapsed day is assumed so a task that reports progress always
/// shows up on the actual curve.
pub fn estimate_actual_end(start: NaiveDate, plan_days: i64, progress: f64) -> Option<NaiveDate> {
    if plan_days <= 0 {
        return None;
    }
    let elapsed = (plan_days as f64 * progress / 100.0).round() as i64;
    let elapsed = elapsed.max(1);
    start.checked_add_days(Days::new((elapsed - 1) as u64))
}

/// Resolve the date range a task's completed work is spread over.
///
/// `None` when the task has no progress or no usable range.
pub fn resolve_actual_span(task: &ProjectTask, as_of: NaiveDate) -> Option<ActualSpan> {
    let progress = task.progress_pct();
    if progress <= 0.0 {
        return None;
    }

    let start = task.actual_start_date.or(task.plan_start_date)?;

    let (end, end_source) = if task.is_complete() {
        match task.actual_end_date {
            Some(end) => (end, ActualEndSource::Recorded),
            None => (as_of, ActualEndSource::AsOf),
        }
    } else if let Some(end) = task.actual_end_date {
        (end, ActualEndSource::Recorded)
    } else {
        let end = estimate_actual_end(start, task.plan_days(), progress)?;
        (end, ActualEndSource::Estimated)
    };

    let span = DateSpan::new(start, end);
    span.is_valid().then_some(ActualSpan { span, end_source })
}

fn has_plan_range(task: &ProjectTask) -> bool {
    matches!(task.plan_range(), Some((start, end)) if end >= start)
}

/// Sum of weights over the tasks that carry scope.
fn scoped_total(tasks: &[&ProjectTask], mode: WeightingMode) -> f64 {
    total_scope(tasks.iter().copied().filter(|t| has_plan_range(t)), mode)
}

/// Fill `planned_increment` from plan dates. No time gating.
pub fn build_planned(
    tasks: &[&ProjectTask],
    buckets: &mut [Bucket],
    mode: WeightingMode,
) -> Vec<SkippedTask> {
    let total = scoped_total(tasks, mode);
    let mut skipped = Vec::new();

    for task in tasks {
        let Some((start, end)) = task.plan_range() else {
            skipped.push(SkippedTask::new(&task.id, DataQualityIssue::MissingPlanDates));
            continue;
        };
        if end < start {
            skipped.push(SkippedTask::new(&task.id, DataQualityIssue::InvertedPlanRange));
            continue;
        }
        let fraction = weight_fraction(task, mode, total);
        if fraction <= 0.0 {
            skipped.push(SkippedTask::new(&task.id, DataQualityIssue::ZeroWeight));
            continue;
        }
        distribute(
            DateSpan::new(start, end),
            fraction * 100.0,
            buckets,
            Series::Planned,
            None,
        );
    }

    skipped
}

/// Fill `actual_increment` with each task's completed share, never past `as_of`.
pub fn build_actual(
    tasks: &[&ProjectTask],
    buckets: &mut [Bucket],
    mode: WeightingMode,
    as_of: NaiveDate,
) -> Vec<SkippedTask> {
    let total = scoped_total(tasks, mode);
    let mut skipped = Vec::new();

    for task in tasks {
        // Already reported by the planned builder.
        if !has_plan_range(task) {
            continue;
        }
        if !task.progress.is_finite() {
            skipped.push(SkippedTask::new(&task.id, DataQualityIssue::NonFiniteProgress));
            continue;
        }
        let progress = task.progress_pct();
        if progress <= 0.0 {
            continue;
        }
        let fraction = weight_fraction(task, mode, total);
        if fraction <= 0.0 {
            continue;
        }
        let Some(actual) = resolve_actual_span(task, as_of) else {
            skipped.push(SkippedTask::new(&task.id, DataQualityIssue::InvalidActualRange));
            continue;
        };
        distribute(
            actual.span,
            fraction * progress,
            buckets,
            Series::Actual,
            Some(as_of),
        );
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Granularity, generate_buckets};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ten_day_task() -> ProjectTask {
        ProjectTask::new("t1", "Formwork").with_plan(d(2024, 1, 1), d(2024, 1, 10))
    }

    #[test]
    fn zero_progress_has_no_actual_span() {
        let t = ten_day_task().with_actual_start(d(2024, 1, 1));
        assert!(resolve_actual_span(&t, d(2024, 1, 5)).is_none());
    }

    #[test]
    fn complete_task_without_end_runs_to_as_of() {
        let t = ten_day_task().with_progress(100.0);
        let a = resolve_actual_span(&t, d(2024, 1, 8)).unwrap();
        assert_eq!(a.span, DateSpan::new(d(2024, 1, 1), d(2024, 1, 8)));
        assert_eq!(a.end_source, ActualEndSource::AsOf);
    }

    #[test]
    fn recorded_end_wins_for_partial_task() {
        let t = ten_day_task()
            .with_progress(30.0)
            .with_actual_start(d(2024, 1, 2))
            .with_actual_end(d(2024, 1, 4));
        let a = resolve_actual_span(&t, d(2024, 1, 20)).unwrap();
        assert_eq!(a.span, DateSpan::new(d(2024, 1, 2), d(2024, 1, 4)));
        assert_eq!(a.end_source, ActualEndSource::Recorded);
    }

    #[test]
    fn partial_task_end_is_linear_estimate() {
        let t = ten_day_task().with_progress(50.0);
        let a = resolve_actual_span(&t, d(2024, 1, 6)).unwrap();
        assert_eq!(a.span.end, d(2024, 1, 5));
        assert_eq!(a.end_source, ActualEndSource::Estimated);
    }

    #[test]
    fn tiny_progress_still_gets_one_day() {
        assert_eq!(estimate_actual_end(d(2024, 1, 1), 10, 4.0), Some(d(2024, 1, 1)));
        assert_eq!(estimate_actual_end(d(2024, 1, 1), 0, 50.0), None);
    }

    #[test]
    fn actual_end_before_start_is_rejected() {
        let t = ten_day_task()
            .with_progress(100.0)
            .with_actual_start(d(2024, 1, 5))
            .with_actual_end(d(2024, 1, 2));
        assert!(resolve_actual_span(&t, d(2024, 1, 20)).is_none());

        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 10), Granularity::Day);
        let skipped = build_actual(&[&t], &mut buckets, WeightingMode::Duration, d(2024, 1, 20));
        assert_eq!(skipped, vec![SkippedTask::new("t1", DataQualityIssue::InvalidActualRange)]);
    }

    #[test]
    fn planned_curve_reports_bad_plan_data() {
        let good = ten_day_task();
        let missing = ProjectTask::new("t2", "Unplanned");
        let inverted = ProjectTask::new("t3", "Typo").with_plan(d(2024, 1, 9), d(2024, 1, 2));
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 10), Granularity::Day);

        let skipped = build_planned(
            &[&good, &missing, &inverted],
            &mut buckets,
            WeightingMode::Duration,
        );

        assert_eq!(
            skipped,
            vec![
                SkippedTask::new("t2", DataQualityIssue::MissingPlanDates),
                SkippedTask::new("t3", DataQualityIssue::InvertedPlanRange),
            ]
        );
        let total: f64 = buckets.iter().map(|b| b.planned_increment).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn undated_tasks_carry_no_cost_scope() {
        let good = ten_day_task()
            .with_cost(100.0)
            .with_progress(100.0)
            .with_actual_start(d(2024, 1, 1))
            .with_actual_end(d(2024, 1, 10));
        let undated = ProjectTask::new("t2", "Unplanned")
            .with_cost(100.0)
            .with_progress(100.0)
            .with_actual_start(d(2024, 1, 1))
            .with_actual_end(d(2024, 1, 10));
        let tasks = [&good, &undated];
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 10), Granularity::Day);

        let skipped = build_planned(&tasks, &mut buckets, WeightingMode::Cost);
        assert_eq!(skipped, vec![SkippedTask::new("t2", DataQualityIssue::MissingPlanDates)]);
        build_actual(&tasks, &mut buckets, WeightingMode::Cost, d(2024, 1, 31));

        let planned: f64 = buckets.iter().map(|b| b.planned_increment).sum();
        let actual: f64 = buckets.iter().map(|b| b.actual_increment).sum();
        assert!((planned - 100.0).abs() < 1e-9);
        assert!((actual - 100.0).abs() < 1e-9);
    }

    #[test]
    fn actual_weight_is_completed_fraction_only() {
        // Recorded range covers the whole plan, but only 40% is done.
        let t = ten_day_task()
            .with_progress(40.0)
            .with_actual_start(d(2024, 1, 1))
            .with_actual_end(d(2024, 1, 10));
        let mut buckets = generate_buckets(d(2024, 1, 1), d(2024, 1, 10), Granularity::Day);
        build_actual(&[&t], &mut buckets, WeightingMode::Duration, d(2024, 1, 31));
        let total: f64 = buckets.iter().map(|b| b.actual_increment).sum();
        assert!((total - 40.0).abs() < 1e-9);
        assert!((buckets[0].actual_increment - 4.0).abs() < 1e-9);
    }
}
