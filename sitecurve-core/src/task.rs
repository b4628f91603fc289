//! Task model consumed by the progress engine.
//!
//! Fields mirror the task documents the dashboard stores, so snapshot exports
//! deserialize straight into `ProjectTask` (camelCase on the wire).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::days_between_inclusive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Group task this task rolls up into.
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub plan_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,

    /// Percent complete, 0-100.
    #[serde(default)]
    pub progress: f64,

    /// Only used under cost weighting.
    #[serde(default)]
    pub cost: Option<f64>,
}

impl ProjectTask {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            plan_start_date: None,
            plan_end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            progress: 0.0,
            cost: None,
        }
    }

    pub fn with_plan(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.plan_start_date = Some(start);
        self.plan_end_date = Some(end);
        self
    }

    pub fn with_actual_start(mut self, start: NaiveDate) -> Self {
        self.actual_start_date = Some(start);
        self
    }

    pub fn with_actual_end(mut self, end: NaiveDate) -> Self {
        self.actual_end_date = Some(end);
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Plan range when both dates are present, regardless of ordering.
    pub fn plan_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.plan_start_date?, self.plan_end_date?))
    }

    /// Inclusive plan length in days; 0 when dates are missing or inverted.
    pub fn plan_days(&self) -> i64 {
        self.plan_range()
            .map(|(s, e)| days_between_inclusive(s, e).max(0))
            .unwrap_or(0)
    }

    /// Progress clamped to [0, 100]; NaN and infinities read as 0.
    pub fn progress_pct(&self) -> f64 {
        if self.progress.is_finite() {
            self.progress.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress_pct() >= 100.0
    }

    /// Cost with non-finite and negative values read as 0.
    pub fn cost_value(&self) -> f64 {
        match self.cost {
            Some(c) if c.is_finite() => c.max(0.0),
            _ => 0.0,
        }
    }
}
