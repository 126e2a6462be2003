//! CSV ingestion for loan and AMI reference files.
//!
//! The pipeline core consumes already-parsed rows; this module is the file
//! boundary around it.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::filter::RawLoanTable;
use crate::records::{LegacyLoanRow, ModernLoanRow, RawAmiRow};

/// Reads a 2007-2017 LAR file into a tagged raw table.
pub fn read_legacy_loans(path: &Path) -> Result<RawLoanTable> {
    let rows = read_rows::<LegacyLoanRow>(path)?;
    Ok(RawLoanTable::Legacy(rows))
}

/// Reads a 2018+ LAR file into a tagged raw table.
pub fn read_modern_loans(path: &Path) -> Result<RawLoanTable> {
    let rows = read_rows::<ModernLoanRow>(path)?;
    Ok(RawLoanTable::Modern(rows))
}

/// Reads the county AMI reference table.
pub fn read_ami(path: &Path) -> Result<Vec<RawAmiRow>> {
    read_rows::<RawAmiRow>(path)
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T =
            result.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "CSV read");
    Ok(rows)
}
