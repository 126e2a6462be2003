//! County-level affordability aggregation.
//!
//! Joins cleaned loans against AMI bands, counts loans affordable to a
//! band's income, and merges the two snapshot years into a change report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ami::{AmiBand, Band};
use crate::error::AffordError;
use crate::model::MortgageTerms;
use crate::records::LoanRecord;

/// Affordable and total loan counts for one county.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyCount {
    pub county_name: String,
    pub affordable: u64,
    pub total: u64,
}

impl CountyCount {
    /// Percentage of this county's loans at or under the threshold.
    pub fn pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.affordable as f64 / self.total as f64) * 100.0
        }
    }
}

/// Per-county affordability counts for one band and year, sorted by county.
#[derive(Debug, Clone, Serialize)]
pub struct CountyReport {
    pub band: Band,
    pub year: u16,
    pub counties: Vec<CountyCount>,
}

/// What to do with counties where no loan clears the threshold.
///
/// A zero count usually means a low-population county with sparse band
/// data rather than true zero affordability, but the data cannot prove
/// which, so the exclusion rule is a caller choice instead of baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ZeroCounts {
    #[default]
    Drop,
    Keep,
}

/// Raw affordable-count difference for one county between the two years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyDelta {
    pub county_name: String,
    pub delta: i64,
}

/// One county's row in the year-over-year change report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub county_name: String,
    pub pct_2010: f64,
    pub pct_2019: f64,
    pub percent_change: f64,
}

/// The merged two-year report, sorted ascending by percent change.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeReport {
    pub generated_at: DateTime<Utc>,
    pub band: Band,
    pub rows: Vec<ChangeRow>,
}

/// Counts, per county, how many loans a household at the county's band
/// income could afford in `year`.
///
/// Loans with no county name, or in a county absent from the band table,
/// do not join and are not counted.
pub fn affordability_by_county(
    loans: &[LoanRecord],
    bands: &[AmiBand],
    band: Band,
    year: u16,
    zero_counts: ZeroCounts,
) -> Result<CountyReport, AffordError> {
    let terms = MortgageTerms::for_year(year)?;

    // County name -> max affordable principal at this band's income.
    let mut thresholds: BTreeMap<&str, f64> = BTreeMap::new();
    for ami in bands {
        let threshold = terms.max_affordable_loan(band.value(ami))?;
        thresholds.insert(ami.county_name.as_str(), threshold);
    }

    let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    let mut unjoined = 0usize;

    for loan in loans {
        let Some(name) = loan.county_name.as_deref() else {
            unjoined += 1;
            continue;
        };
        let Some((&county, &threshold)) = thresholds.get_key_value(name) else {
            unjoined += 1;
            continue;
        };

        let entry = counts.entry(county).or_insert((0, 0));
        entry.1 += 1;
        if loan.loan_amount <= threshold {
            entry.0 += 1;
        }
    }

    if unjoined > 0 {
        debug!(
            unjoined,
            year,
            band = band.label(),
            "Loans without a matching AMI county"
        );
    }

    let counties = counts
        .into_iter()
        .map(|(county_name, (affordable, total))| CountyCount {
            county_name: county_name.to_string(),
            affordable,
            total,
        })
        .filter(|c| zero_counts == ZeroCounts::Keep || c.affordable > 0)
        .collect();

    Ok(CountyReport {
        band,
        year,
        counties,
    })
}

/// Subtracts matched counties' raw affordable counts (`latest - baseline`).
///
/// Counties present in only one report are excluded and logged; the source
/// data is missing reference-year AMI rows for some small counties, so an
/// unmatched county is expected rather than an error.
pub fn change_in_count(latest: &CountyReport, baseline: &CountyReport) -> Vec<CountyDelta> {
    let base: BTreeMap<&str, u64> = baseline
        .counties
        .iter()
        .map(|c| (c.county_name.as_str(), c.affordable))
        .collect();

    let mut deltas = Vec::new();
    for county in &latest.counties {
        match base.get(county.county_name.as_str()) {
            Some(&baseline_count) => deltas.push(CountyDelta {
                county_name: county.county_name.clone(),
                delta: county.affordable as i64 - baseline_count as i64,
            }),
            None => warn!(
                county = %county.county_name,
                year = baseline.year,
                "County missing from baseline report, excluded from deltas"
            ),
        }
    }

    for county in &baseline.counties {
        if !latest.counties.iter().any(|c| c.county_name == county.county_name) {
            warn!(
                county = %county.county_name,
                year = latest.year,
                "County missing from latest report, excluded from deltas"
            );
        }
    }

    deltas
}

/// Inner-joins the two years' county reports and computes the change in the
/// percentage of affordable loans, sorted ascending.
///
/// A zero baseline percentage has no defined percent change and fails the
/// merge rather than producing infinity.
pub fn merge_years(
    baseline_2010: &CountyReport,
    latest_2019: &CountyReport,
) -> Result<ChangeReport, AffordError> {
    let base: BTreeMap<&str, &CountyCount> = baseline_2010
        .counties
        .iter()
        .map(|c| (c.county_name.as_str(), c))
        .collect();

    let mut rows = Vec::new();
    for county in &latest_2019.counties {
        let Some(baseline) = base.get(county.county_name.as_str()) else {
            continue;
        };

        let pct_2010 = baseline.pct();
        let pct_2019 = county.pct();
        if pct_2010 == 0.0 {
            return Err(AffordError::ZeroBaseline(county.county_name.clone()));
        }

        rows.push(ChangeRow {
            county_name: county.county_name.clone(),
            pct_2010,
            pct_2019,
            percent_change: round2(100.0 * (pct_2019 - pct_2010) / pct_2010),
        });
    }

    rows.sort_by(|a, b| a.percent_change.total_cmp(&b.percent_change));

    Ok(ChangeReport {
        generated_at: Utc::now(),
        band: latest_2019.band,
        rows,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
