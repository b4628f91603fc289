//! Task weighting: each task's share of total project scope.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::ProjectTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingMode {
    /// Weight = inclusive plan length in days.
    #[default]
    Duration,
    /// Weight = task cost.
    Cost,
}

impl FromStr for WeightingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duration" => Ok(WeightingMode::Duration),
            "cost" => Ok(WeightingMode::Cost),
            other => Err(format!("unknown weighting '{other}' (expected duration|cost)")),
        }
    }
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightingMode::Duration => f.write_str("duration"),
            WeightingMode::Cost => f.write_str("cost"),
        }
    }
}

/// Raw weight of a task, always >= 0.
pub fn task_weight(task: &ProjectTask, mode: WeightingMode) -> f64 {
    match mode {
        WeightingMode::Duration => task.plan_days() as f64,
        WeightingMode::Cost => task.cost_value(),
    }
}

/// Sum of weights over the given tasks.
pub fn total_scope<'a, I>(tasks: I, mode: WeightingMode) -> f64
where
    I: IntoIterator<Item = &'a ProjectTask>,
{
    tasks.into_iter().map(|t| task_weight(t, mode)).sum()
}

/// Fraction of total scope (0..=1). A zero total gives 0, never NaN.
pub fn weight_fraction(task: &ProjectTask, mode: WeightingMode, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    task_weight(task, mode) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn duration_weight_is_inclusive_days() {
        let t = ProjectTask::new("a", "Excavation").with_plan(d(2024, 1, 1), d(2024, 1, 5));
        assert_eq!(task_weight(&t, WeightingMode::Duration), 5.0);
        // No cost recorded -> nothing under cost weighting.
        assert_eq!(task_weight(&t, WeightingMode::Cost), 0.0);
    }

    #[test]
    fn fractions_sum_to_one() {
        let tasks = vec![
            ProjectTask::new("a", "A").with_plan(d(2024, 1, 1), d(2024, 1, 5)),
            ProjectTask::new("b", "B").with_plan(d(2024, 1, 6), d(2024, 1, 20)),
        ];
        let total = total_scope(&tasks, WeightingMode::Duration);
        assert_eq!(total, 20.0);
        let sum: f64 = tasks
            .iter()
            .map(|t| weight_fraction(t, WeightingMode::Duration, total))
            .sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_total_scope_gives_zero_fraction() {
        let t = ProjectTask::new("a", "A");
        assert_eq!(weight_fraction(&t, WeightingMode::Cost, 0.0), 0.0);
    }

    #[test]
    fn parse_mode() {
        assert_eq!("Cost".parse::<WeightingMode>().unwrap(), WeightingMode::Cost);
        assert!("weight".parse::<WeightingMode>().is_err());
        assert_eq!(WeightingMode::Duration.to_string(), "duration");
    }
}
