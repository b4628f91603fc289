//! sitecurve-ingest: task CSV/JSON import, task and curve CSV export.

pub mod curve_csv;
pub mod snapshot;
pub mod task_csv;
pub mod types;

pub use curve_csv::write_curve_csv;
pub use snapshot::{load_snapshot, parse_snapshot};
pub use task_csv::{parse_tasks_csv, parse_tasks_reader, write_tasks_csv};
pub use types::{ImportReport, RejectedRow, TaskRow};

use anyhow::{Result, bail};
use std::path::Path;

/// Load tasks from a `.csv` or `.json` file, chosen by extension.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<ImportReport> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("csv") => parse_tasks_csv(path),
        Some("json") => Ok(ImportReport {
            tasks: load_snapshot(path)?,
            rejected: Vec::new(),
        }),
        _ => bail!(
            "unsupported task file {} (expected .csv or .json)",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("tasks.CSV");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "id,plan_start,plan_end,progress").unwrap();
        writeln!(f, "a,2024-01-01,2024-01-10,50").unwrap();
        drop(f);
        assert_eq!(load_tasks(&csv_path).unwrap().tasks.len(), 1);

        let json_path = dir.path().join("tasks.json");
        std::fs::write(&json_path, r#"{"tasks":[{"id":"a"},{"id":"b"}]}"#).unwrap();
        assert_eq!(load_tasks(&json_path).unwrap().tasks.len(), 2);

        let other = dir.path().join("tasks.xlsx");
        std::fs::write(&other, "").unwrap();
        assert!(load_tasks(&other).is_err());
    }

    #[test]
    fn missing_file_has_path_in_error() {
        let err = load_tasks("/nonexistent/tasks.csv").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/tasks.csv"));
    }
}
