//! Error and data-quality types for the progress engine.
//!
//! The engine has exactly one hard failure: a caller handing it arguments it
//! cannot interpret. Everything wrong with an individual task is soft and
//! ends up in `ProgressCurveResult::skipped` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CurveError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CurveError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;

/// Per-task anomaly that made the engine drop some or all of a task's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataQualityIssue {
    /// Plan start or plan end is absent.
    MissingPlanDates,
    /// Plan end falls before plan start.
    InvertedPlanRange,
    /// Task has no weight under the selected weighting mode.
    ZeroWeight,
    /// Progress > 0 but no usable actual date range could be resolved.
    InvalidActualRange,
    /// Progress was NaN or infinite and was read as 0.
    NonFiniteProgress,
    /// A recorded end date lies so far out that the curve could not reach it.
    ImplausibleDate,
}

impl DataQualityIssue {
    pub fn describe(&self) -> &'static str {
        match self {
            DataQualityIssue::MissingPlanDates => "missing plan start/end date",
            DataQualityIssue::InvertedPlanRange => "plan end is before plan start",
            DataQualityIssue::ZeroWeight => "zero weight under selected weighting",
            DataQualityIssue::InvalidActualRange => "actual date range could not be resolved",
            DataQualityIssue::NonFiniteProgress => "progress is not a finite number",
            DataQualityIssue::ImplausibleDate => "end date is implausibly far out",
        }
    }
}

/// A task the engine excluded (wholly or partly) and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub id: String,
    pub issue: DataQualityIssue,
}

impl SkippedTask {
    pub fn new(id: impl Into<String>, issue: DataQualityIssue) -> Self {
        Self {
            id: id.into(),
            issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message() {
        let err = CurveError::invalid("as_of is NaN");
        assert_eq!(err.to_string(), "invalid argument: as_of is NaN");
    }

    #[test]
    fn issue_serializes_kebab_case() {
        let s = serde_json::to_string(&DataQualityIssue::InvertedPlanRange).unwrap();
        assert_eq!(s, "\"inverted-plan-range\"");
    }
}
