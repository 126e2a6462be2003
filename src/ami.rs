//! County AMI band reference data.
//!
//! Normalizes the raw reference table (column renames are handled by serde
//! on [`RawAmiRow`]), derives the 100% band from the 80% band, and splits
//! the table into the two snapshot years.

use serde::Serialize;

use crate::error::AffordError;
use crate::records::RawAmiRow;

/// One county's income bands for one year, in dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmiBand {
    pub county_name: String,
    pub year: u16,
    pub ami_80: f64,
    pub ami_100: f64,
    pub ami_120: f64,
}

/// Selector over the three AMI band columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Ami80,
    Ami100,
    Ami120,
}

impl Band {
    /// Display label matching the reference-table column naming.
    pub fn label(self) -> &'static str {
        match self {
            Band::Ami80 => "80% AMI",
            Band::Ami100 => "100% AMI",
            Band::Ami120 => "120% AMI",
        }
    }

    /// Parses a column label such as "80% AMI" or "80".
    pub fn parse(label: &str) -> Result<Self, AffordError> {
        match label.trim().trim_end_matches("% AMI").trim() {
            "80" => Ok(Band::Ami80),
            "100" => Ok(Band::Ami100),
            "120" => Ok(Band::Ami120),
            _ => Err(AffordError::UnknownBand(label.to_string())),
        }
    }

    /// The income figure this band selects from a county's row.
    pub fn value(self, band: &AmiBand) -> f64 {
        match self {
            Band::Ami80 => band.ami_80,
            Band::Ami100 => band.ami_100,
            Band::Ami120 => band.ami_120,
        }
    }
}

/// The reference table split into the two snapshot years.
#[derive(Debug, Clone, PartialEq)]
pub struct AmiTables {
    pub y2010: Vec<AmiBand>,
    pub y2019: Vec<AmiBand>,
}

impl AmiTables {
    pub fn for_year(&self, year: u16) -> Result<&[AmiBand], AffordError> {
        match year {
            2010 => Ok(&self.y2010),
            2019 => Ok(&self.y2019),
            _ => Err(AffordError::UnsupportedModelYear(year)),
        }
    }
}

/// Normalizes raw reference rows and splits them by snapshot year.
///
/// The 100% band is derived as 80% band x 1.25. Rows for other years are
/// not selected; no further filtering happens here.
pub fn split_by_year(rows: Vec<RawAmiRow>) -> AmiTables {
    let mut y2010 = Vec::new();
    let mut y2019 = Vec::new();

    for row in rows {
        let band = AmiBand {
            county_name: row.county_name,
            year: row.year,
            ami_80: row.ami_80,
            ami_100: row.ami_80 * 1.25,
            ami_120: row.ami_120,
        };
        match band.year {
            2010 => y2010.push(band),
            2019 => y2019.push(band),
            _ => {}
        }
    }

    AmiTables { y2010, y2019 }
}
