//! Terminal rendering of a computed curve.

use sitecurve_core::ProgressCurveResult;
use std::fmt::Write;

pub fn curve_table(curve: &ProgressCurveResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>9} {:>9} {:>10} {:>10}",
        "bucket", "planned", "actual", "cum.plan", "cum.actual"
    );

    let now = curve.as_of_bucket().map(|b| b.start);
    for b in &curve.buckets {
        let marker = if Some(b.start) == now { " <" } else { "" };
        let _ = writeln!(
            out,
            "{:<16} {:>9.2} {:>9.2} {:>10.2} {:>10.2}{marker}",
            b.label, b.planned_increment, b.actual_increment, b.cumulative_planned, b.cumulative_actual
        );
    }
    out
}

pub fn kpi_summary(curve: &ProgressCurveResult) -> String {
    let k = &curve.kpis;
    let mut out = String::new();
    let _ = writeln!(out, "as of:     {}", curve.as_of.format("%Y-%m-%d"));
    let _ = writeln!(out, "planned:   {:.2}%", k.current_planned);
    let _ = writeln!(out, "actual:    {:.2}%", k.current_actual);
    let _ = writeln!(out, "variance:  {:+.2}%", k.variance);
    if let Some(days) = k.variance_days {
        let _ = writeln!(out, "schedule:  {days:+} days");
    }
    if let Some(spi) = k.schedule_performance_index {
        let _ = writeln!(out, "spi:       {spi:.2}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sitecurve_core::{CurveOptions, Granularity, ProjectTask, compute_progress_curve};

    #[test]
    fn marks_as_of_bucket() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let tasks = vec![
            ProjectTask::new("a", "Slab")
                .with_plan(d(1), d(4))
                .with_progress(50.0),
        ];
        let opts = CurveOptions::new(d(1), d(4), d(2)).with_granularity(Granularity::Day);
        let curve = compute_progress_curve(&tasks, &opts).unwrap();

        let table = curve_table(&curve);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("2024-01-02"));
        assert!(lines[2].ends_with(" <"));
        assert!(!lines[3].ends_with(" <"));

        let summary = kpi_summary(&curve);
        assert!(summary.contains("planned:   50.00%"));
        assert!(summary.contains("actual:    50.00%"));
        assert!(summary.contains("schedule:  +0 days"));
    }
}
