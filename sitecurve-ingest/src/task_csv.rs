//! Task CSV import/export.
//!
//! Expected header (order and case don't matter, camelCase/snake_case both work):
//! id,name,parent_id,plan_start,plan_end,actual_start,actual_end,progress,cost
//!
//! Dates: YYYY-MM-DD, DD/MM/YYYY (site spreadsheets), YYYY/MM/DD, or RFC3339.
//! Progress: `45` or `45%`. Numbers may carry `,` thousands separators; a
//! decimal comma (`1,5`) is rejected rather than misread.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate};
use sitecurve_core::ProjectTask;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::types::{ImportReport, RejectedRow, TaskRow};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Id,
    Name,
    ParentId,
    PlanStart,
    PlanEnd,
    ActualStart,
    ActualEnd,
    Progress,
    Cost,
}

fn column_for(header: &str) -> Option<Column> {
    let key: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    match key.as_str() {
        "id" | "taskid" => Some(Column::Id),
        "name" | "taskname" | "title" => Some(Column::Name),
        "parentid" | "parent" => Some(Column::ParentId),
        "planstart" | "planstartdate" | "plannedstart" => Some(Column::PlanStart),
        "planend" | "planenddate" | "plannedend" => Some(Column::PlanEnd),
        "actualstart" | "actualstartdate" => Some(Column::ActualStart),
        "actualend" | "actualenddate" => Some(Column::ActualEnd),
        "progress" | "percentcomplete" | "progresspct" => Some(Column::Progress),
        "cost" | "budget" => Some(Column::Cost),
        _ => None,
    }
}

/// Parse a date cell. Empty cells are `None`; anything unreadable is an error.
pub fn parse_date(s: &str) -> std::result::Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(Some(d));
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| format!("unrecognized date '{s}'"))
}

/// Drop thousands separators. `None` when a comma is used any other way
/// (`1,5` as a decimal comma, `12,34`, `1,000.5,0`).
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let digits = int_part.trim_start_matches(['-', '+']);
    let mut groups = digits.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !lead.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    Some(s.replace(',', ""))
}

/// Parse a numeric cell, tolerating a trailing `%` and `,` thousands separators.
pub fn parse_number(s: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = s.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let cleaned = strip_thousands(trimmed)
        .ok_or_else(|| format!("ambiguous separators in '{}'", s.trim()))?;
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("not a number '{}'", s.trim())),
    }
}

struct ColumnMap(HashMap<Column, usize>);

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if let Some(col) = column_for(h) {
                map.entry(col).or_insert(i);
            }
        }
        Self(map)
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, col: Column) -> &'r str {
        self.0
            .get(&col)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
            .trim()
    }
}

fn parse_row(
    record: &csv::StringRecord,
    cols: &ColumnMap,
    line: u64,
) -> std::result::Result<ProjectTask, String> {
    let date = |col: Column, label: &str| {
        parse_date(cols.get(record, col)).map_err(|e| format!("{label}: {e}"))
    };

    let id = match cols.get(record, Column::Id) {
        "" => format!("row-{line}"),
        id => id.to_string(),
    };
    let parent_id = Some(cols.get(record, Column::ParentId))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let progress = parse_number(cols.get(record, Column::Progress))
        .map_err(|e| format!("progress: {e}"))?
        .unwrap_or(0.0);
    let cost = parse_number(cols.get(record, Column::Cost)).map_err(|e| format!("cost: {e}"))?;

    Ok(ProjectTask {
        id,
        name: cols.get(record, Column::Name).to_string(),
        parent_id,
        plan_start_date: date(Column::PlanStart, "plan_start")?,
        plan_end_date: date(Column::PlanEnd, "plan_end")?,
        actual_start_date: date(Column::ActualStart, "actual_start")?,
        actual_end_date: date(Column::ActualEnd, "actual_end")?,
        progress,
        cost,
    })
}

/// Read tasks from any CSV source. Bad rows are collected, not fatal.
pub fn parse_tasks_reader<R: Read>(reader: R) -> Result<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let cols = ColumnMap::from_headers(&headers);
    if cols.0.is_empty() {
        bail!("no recognizable task columns in header: {:?}", headers.iter().collect::<Vec<_>>());
    }

    let mut report = ImportReport::default();

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(e).context("reading CSV");
                }
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                report.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match parse_row(&record, &cols, line) {
            Ok(task) => report.tasks.push(task),
            Err(reason) => {
                warn!(line, %reason, "skipping task row");
                report.rejected.push(RejectedRow { line, reason });
            }
        }
    }

    debug!(
        tasks = report.tasks.len(),
        rejected = report.rejected.len(),
        "parsed task CSV"
    );
    Ok(report)
}

/// Read a task CSV file.
pub fn parse_tasks_csv(path: impl AsRef<Path>) -> Result<ImportReport> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_tasks_reader(file).with_context(|| format!("parsing {}", path.display()))
}

/// Write tasks with the import column layout and ISO dates.
pub fn write_tasks_csv<W: Write>(tasks: &[ProjectTask], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in tasks {
        wtr.serialize(TaskRow::from(t))
            .with_context(|| format!("writing task {}", t.id))?;
    }
    wtr.flush().context("flushing task CSV")?;
    Ok(())
}
