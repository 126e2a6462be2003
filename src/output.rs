//! Output formatting and persistence for the change report.
//!
//! Supports JSON logging and CSV export. Downstream rendering (tables as
//! images, plots) is a separate consumer's concern.

use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::aggregate::{ChangeReport, CountyDelta, CountyReport};

/// Logs the change report as pretty-printed JSON.
pub fn print_json(report: &ChangeReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the change report rows to a CSV file with headers.
pub fn write_change_csv(path: &Path, report: &ChangeReport) -> Result<()> {
    debug!(path = %path.display(), rows = report.rows.len(), "Writing change report");

    let mut writer = WriterBuilder::new().from_writer(File::create(path)?);
    for row in &report.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes per-county counts for a single band/year to a CSV file.
pub fn write_counts_csv(path: &Path, report: &CountyReport) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(File::create(path)?);
    for county in &report.counties {
        writer.serialize(county)?;
    }
    writer.flush()?;

    Ok(())
}

/// Logs per-county affordable-count deltas at info level.
pub fn log_deltas(deltas: &[CountyDelta]) {
    for delta in deltas {
        info!(county = %delta.county_name, delta = delta.delta, "Change in affordable loans");
    }
}
