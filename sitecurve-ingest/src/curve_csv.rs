//! Curve table export: one row per bucket.

use anyhow::{Context, Result};
use sitecurve_core::ProgressCurveResult;
use std::io::Write;

const HEADER: [&str; 7] = [
    "start",
    "end",
    "label",
    "planned_increment",
    "actual_increment",
    "cumulative_planned",
    "cumulative_actual",
];

pub fn write_curve_csv<W: Write>(curve: &ProgressCurveResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).context("writing curve header")?;

    for b in &curve.buckets {
        wtr.write_record([
            b.start.format("%Y-%m-%d").to_string(),
            b.end.format("%Y-%m-%d").to_string(),
            b.label.clone(),
            format!("{:.2}", b.planned_increment),
            format!("{:.2}", b.actual_increment),
            format!("{:.2}", b.cumulative_planned),
            format!("{:.2}", b.cumulative_actual),
        ])
        .with_context(|| format!("writing bucket {}", b.label))?;
    }

    wtr.flush().context("flushing curve CSV")?;
    Ok(())
}
