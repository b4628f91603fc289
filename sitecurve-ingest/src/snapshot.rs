//! JSON task snapshots exported from the project database.
//!
//! Accepts either a bare array of task documents or `{ "tasks": [...] }`.

use anyhow::{Context, Result};
use serde::Deserialize;
use sitecurve_core::ProjectTask;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDoc {
    Bare(Vec<ProjectTask>),
    Wrapped { tasks: Vec<ProjectTask> },
}

pub fn parse_snapshot(json: &str) -> Result<Vec<ProjectTask>> {
    let doc: SnapshotDoc = serde_json::from_str(json).context("parsing task snapshot JSON")?;
    Ok(match doc {
        SnapshotDoc::Bare(tasks) => tasks,
        SnapshotDoc::Wrapped { tasks } => tasks,
    })
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<ProjectTask>> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_snapshot(&s).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bare_and_wrapped_forms() {
        let bare = r#"[{"id":"a","planStartDate":"2024-01-01","planEndDate":"2024-01-05","progress":20}]"#;
        let wrapped = r#"{"project":"Tower B","tasks":[{"id":"a","name":"Piles","parentId":"g"}]}"#;

        let a = parse_snapshot(bare).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].plan_end_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(a[0].progress, 20.0);

        let b = parse_snapshot(wrapped).unwrap();
        assert_eq!(b[0].name, "Piles");
        assert_eq!(b[0].parent_id.as_deref(), Some("g"));
    }

    #[test]
    fn malformed_snapshot_errors() {
        assert!(parse_snapshot(r#"{"rows": 3}"#).is_err());
    }
}
