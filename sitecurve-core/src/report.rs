//! Plain-text progress report, the body of the daily site notification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::ProgressCurveResult;
use crate::rollup::leaf_tasks;
use crate::task::ProjectTask;
use crate::time::days_between_inclusive;

/// Percent a task should be at on `as_of` if its plan runs linearly.
pub fn expected_progress(task: &ProjectTask, as_of: NaiveDate) -> f64 {
    let Some((start, end)) = task.plan_range() else {
        return 0.0;
    };
    if end < start || as_of < start {
        return 0.0;
    }
    if as_of >= end {
        return 100.0;
    }
    let elapsed = days_between_inclusive(start, as_of) as f64;
    100.0 * elapsed / task.plan_days() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehindTask {
    pub id: String,
    pub name: String,
    pub expected: f64,
    pub actual: f64,
}

impl BehindTask {
    pub fn gap(&self) -> f64 {
        self.expected - self.actual
    }
}

/// Leaf tasks trailing their linear plan by more than `threshold` points, worst first.
pub fn behind_schedule(tasks: &[ProjectTask], as_of: NaiveDate, threshold: f64) -> Vec<BehindTask> {
    let mut out: Vec<BehindTask> = leaf_tasks(tasks)
        .into_iter()
        .map(|t| BehindTask {
            id: t.id.clone(),
            name: t.name.clone(),
            expected: expected_progress(t, as_of),
            actual: t.progress_pct(),
        })
        .filter(|b| b.gap() > threshold)
        .collect();

    out.sort_by(|a, b| b.gap().total_cmp(&a.gap()).then_with(|| a.id.cmp(&b.id)));
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    pub project_name: String,
    /// Percentage points a task may trail its plan before it is listed.
    pub behind_threshold: f64,
    /// Cap on listed tasks; the rest are summarized as a count.
    pub max_items: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            project_name: "Project".to_string(),
            behind_threshold: 5.0,
            max_items: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub project_name: String,
    pub as_of: NaiveDate,
    pub planned: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_days: Option<i64>,
    pub behind: Vec<BehindTask>,
    pub max_items: usize,
}

impl ProgressReport {
    pub fn build(tasks: &[ProjectTask], curve: &ProgressCurveResult, opts: &ReportOptions) -> Self {
        Self {
            project_name: opts.project_name.clone(),
            as_of: curve.as_of,
            planned: curve.kpis.current_planned,
            actual: curve.kpis.current_actual,
            variance: curve.kpis.variance,
            variance_days: curve.kpis.variance_days,
            behind: behind_schedule(tasks, curve.as_of, opts.behind_threshold),
            max_items: opts.max_items,
        }
    }

    fn status(&self) -> &'static str {
        if self.variance > 0.005 {
            "ahead"
        } else if self.variance < -0.005 {
            "behind"
        } else {
            "on track"
        }
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project: {}", self.project_name)?;
        writeln!(f, "Progress as of {}", self.as_of.format("%Y-%m-%d"))?;
        writeln!(f, "Planned: {:.2}%", self.planned)?;
        writeln!(f, "Actual: {:.2}%", self.actual)?;

        write!(f, "Variance: {:+.2}% ({}", self.variance, self.status())?;
        match self.variance_days {
            Some(days) if days != 0 => {
                let n = days.abs();
                write!(f, ", {n} day{}", if n == 1 { "" } else { "s" })?
            }
            _ => {}
        }
        writeln!(f, ")")?;

        if self.behind.is_empty() {
            return Ok(());
        }
        writeln!(f, "Behind schedule ({}):", self.behind.len())?;
        for b in self.behind.iter().take(self.max_items) {
            writeln!(
                f,
                "- {} {}: {:.1}% done, {:.1}% expected",
                b.id, b.name, b.actual, b.expected
            )?;
        }
        if self.behind.len() > self.max_items {
            writeln!(f, "...and {} more", self.behind.len() - self.max_items)?;
        }
        Ok(())
    }
}
