use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitecurve_core::ProjectTask;

/// A CSV row that could not be turned into a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    pub reason: String,
}

/// Outcome of reading a task file: the tasks that parsed plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub tasks: Vec<ProjectTask>,
    pub rejected: Vec<RejectedRow>,
}

/// Flat CSV shape of a task, used for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub plan_start: Option<NaiveDate>,
    pub plan_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub progress: f64,
    pub cost: Option<f64>,
}

impl From<&ProjectTask> for TaskRow {
    fn from(t: &ProjectTask) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            parent_id: t.parent_id.clone(),
            plan_start: t.plan_start_date,
            plan_end: t.plan_end_date,
            actual_start: t.actual_start_date,
            actual_end: t.actual_end_date,
            progress: t.progress,
            cost: t.cost,
        }
    }
}
