//! sitecurve-core: S-Curve progress engine for construction schedules.
//!
//! Turns a snapshot of project tasks into cumulative planned-vs-actual
//! progress curves bucketed by day, week or month, plus headline KPIs.

pub mod bucket;
pub mod curve;
pub mod distribute;
pub mod engine;
pub mod error;
pub mod report;
pub mod rollup;
pub mod summary;
pub mod task;
pub mod time;
pub mod weighting;

pub use bucket::{Bucket, Granularity, bucket_count, generate_buckets};
pub use curve::{ActualEndSource, ActualSpan, build_actual, build_planned, resolve_actual_span};
pub use distribute::{DateSpan, Series, distribute};
pub use engine::{CurveOptions, MAX_BUCKETS, ProgressCurveResult, compute_progress_curve};
pub use error::{CurveError, DataQualityIssue, SkippedTask};
pub use report::{BehindTask, ProgressReport, ReportOptions, behind_schedule, expected_progress};
pub use rollup::{leaf_tasks, rollup_groups};
pub use summary::{CurveKpis, aggregate};
pub use task::ProjectTask;
pub use weighting::{WeightingMode, task_weight, total_scope, weight_fraction};
