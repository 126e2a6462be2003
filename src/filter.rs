//! Loan record filtering and normalization.
//!
//! HMDA changed its LAR layout in 2018, so filtering rules are keyed by a
//! closed schema-family enumeration rather than year literals scattered
//! through the code. Adding a year that shares an existing layout only
//! touches [`SchemaFamily::for_year`].

use std::collections::HashMap;

use tracing::debug;

use crate::error::AffordError;
use crate::records::{LegacyLoanRow, LoanRecord, ModernLoanRow};

/// First-lien product types kept from the modern schema.
static FIRST_LIEN_PRODUCTS: &[&str] = &[
    "Conventional:First Lien",
    "FHA:First Lien",
    "VA:First Lien",
    "FSA/RHS:First Lien",
];

/// The two HMDA LAR layout generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFamily {
    /// 2007-2017: `_000s` amount fields, county names in the data.
    Legacy,
    /// 2018 onward: derived product types, dollar amounts, FIPS codes only.
    Modern,
}

impl SchemaFamily {
    pub fn for_year(year: u16) -> Result<Self, AffordError> {
        match year {
            2007..=2017 => Ok(SchemaFamily::Legacy),
            2018..=2019 => Ok(SchemaFamily::Modern),
            _ => Err(AffordError::UnsupportedSchemaYear(year)),
        }
    }
}

/// A raw loan table tagged with the schema family it was read under.
#[derive(Debug, Clone)]
pub enum RawLoanTable {
    Modern(Vec<ModernLoanRow>),
    Legacy(Vec<LegacyLoanRow>),
}

impl RawLoanTable {
    pub fn family(&self) -> SchemaFamily {
        match self {
            RawLoanTable::Modern(_) => SchemaFamily::Modern,
            RawLoanTable::Legacy(_) => SchemaFamily::Legacy,
        }
    }
}

/// Filters and normalizes a raw loan table for `year`.
///
/// Keeps originated, first-lien, owner-occupied, home-purchase loans and
/// drops any row with a missing required field. Errors if `year` has no
/// schema or does not match the table's family.
pub fn clean_loans(table: &RawLoanTable, year: u16) -> Result<Vec<LoanRecord>, AffordError> {
    let family = SchemaFamily::for_year(year)?;
    if family != table.family() {
        return Err(AffordError::SchemaMismatch {
            year,
            expected: family,
            got: table.family(),
        });
    }

    let records = match table {
        RawLoanTable::Modern(rows) => clean_modern(rows),
        RawLoanTable::Legacy(rows) => clean_legacy(rows),
    };
    Ok(records)
}

fn clean_modern(rows: &[ModernLoanRow]) -> Vec<LoanRecord> {
    let mut kept = Vec::new();
    let mut dropped_incomplete = 0usize;

    for row in rows {
        let product = row.derived_loan_product_type.as_deref().unwrap_or("");
        let selected = FIRST_LIEN_PRODUCTS.contains(&product)
            && row.business_or_commercial_purpose == Some(2)
            && row.loan_purpose == Some(1)
            && row.occupancy_type == Some(1)
            && row.action_taken == Some(1);
        if !selected {
            continue;
        }

        // Required fields; income arrives in thousands.
        match (row.loan_amount, row.income, row.county_code) {
            (Some(loan_amount), Some(income), Some(county_code)) => kept.push(LoanRecord {
                loan_amount,
                applicant_income: income * 1000.0,
                county_code: county_code as u32,
                county_name: None,
                property_value: row.property_value,
            }),
            _ => dropped_incomplete += 1,
        }
    }

    debug!(
        kept = kept.len(),
        dropped_incomplete, "Modern loan rows cleaned"
    );
    kept
}

fn clean_legacy(rows: &[LegacyLoanRow]) -> Vec<LoanRecord> {
    let mut kept = Vec::new();
    let mut dropped_incomplete = 0usize;

    for row in rows {
        let selected = row.owner_occupancy == Some(1)
            && row.loan_purpose == Some(1)
            && row.action_taken == Some(1)
            && row.lien_status == Some(1);
        if !selected {
            continue;
        }

        // Amount fields are denominated in thousands.
        match (
            row.loan_amount_000s,
            row.applicant_income_000s,
            &row.county_name,
            row.county_code,
        ) {
            (Some(amount), Some(income), Some(county_name), Some(county_code)) => {
                kept.push(LoanRecord {
                    loan_amount: amount * 1000.0,
                    applicant_income: income * 1000.0,
                    county_code: county_code as u32,
                    county_name: Some(county_name.clone()),
                    property_value: None,
                })
            }
            _ => dropped_incomplete += 1,
        }
    }

    debug!(
        kept = kept.len(),
        dropped_incomplete, "Legacy loan rows cleaned"
    );
    kept
}

/// Builds a county_code -> county_name index from records that carry both.
///
/// Legacy-year records name their counties; modern-year records only carry
/// FIPS codes, and the AMI reference table only carries names, so the
/// legacy snapshot supplies the bridge between the two.
pub fn county_name_index(records: &[LoanRecord]) -> HashMap<u32, String> {
    let mut index = HashMap::new();
    for record in records {
        if let Some(name) = &record.county_name {
            index.entry(record.county_code).or_insert_with(|| name.clone());
        }
    }
    index
}

/// Fills in missing county names from a county-code index.
pub fn attach_county_names(records: &mut [LoanRecord], index: &HashMap<u32, String>) {
    let mut unmatched = 0usize;
    for record in records.iter_mut() {
        if record.county_name.is_none() {
            match index.get(&record.county_code) {
                Some(name) => record.county_name = Some(name.clone()),
                None => unmatched += 1,
            }
        }
    }
    if unmatched > 0 {
        debug!(unmatched, "Loan records with no county name after attach");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modern_row() -> ModernLoanRow {
        ModernLoanRow {
            derived_loan_product_type: Some("Conventional:First Lien".to_string()),
            business_or_commercial_purpose: Some(2),
            loan_purpose: Some(1),
            occupancy_type: Some(1),
            action_taken: Some(1),
            loan_amount: Some(305_000.0),
            property_value: Some(380_000.0),
            income: Some(96.0),
            county_code: Some(6019.0),
        }
    }

    fn legacy_row() -> LegacyLoanRow {
        LegacyLoanRow {
            owner_occupancy: Some(1),
            loan_purpose: Some(1),
            action_taken: Some(1),
            lien_status: Some(1),
            loan_amount_000s: Some(240.0),
            applicant_income_000s: Some(71.0),
            county_name: Some("Fresno County".to_string()),
            county_code: Some(6019.0),
        }
    }

    #[test]
    fn test_modern_keeps_matching_row_and_scales_income() {
        let table = RawLoanTable::Modern(vec![modern_row()]);
        let records = clean_loans(&table, 2019).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].applicant_income, 96_000.0);
        assert_eq!(records[0].loan_amount, 305_000.0);
        assert_eq!(records[0].county_code, 6019);
        assert_eq!(records[0].county_name, None);
    }

    #[test]
    fn test_modern_excludes_business_purpose() {
        let mut row = modern_row();
        row.business_or_commercial_purpose = Some(1);
        let table = RawLoanTable::Modern(vec![row]);
        assert!(clean_loans(&table, 2019).unwrap().is_empty());
    }

    #[test]
    fn test_modern_excludes_junior_lien_product() {
        let mut row = modern_row();
        row.derived_loan_product_type = Some("Conventional:Subordinate Lien".to_string());
        let table = RawLoanTable::Modern(vec![row]);
        assert!(clean_loans(&table, 2019).unwrap().is_empty());
    }

    #[test]
    fn test_modern_drops_row_missing_county_code() {
        let mut row = modern_row();
        row.county_code = None;
        let table = RawLoanTable::Modern(vec![row]);
        assert!(clean_loans(&table, 2019).unwrap().is_empty());
    }

    #[test]
    fn test_legacy_scales_thousands_fields() {
        let table = RawLoanTable::Legacy(vec![legacy_row()]);
        let records = clean_loans(&table, 2010).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].loan_amount, 240_000.0);
        assert_eq!(records[0].applicant_income, 71_000.0);
        assert_eq!(records[0].county_name.as_deref(), Some("Fresno County"));
    }

    #[test]
    fn test_legacy_excludes_junior_lien() {
        let mut row = legacy_row();
        row.lien_status = Some(2);
        let table = RawLoanTable::Legacy(vec![row]);
        assert!(clean_loans(&table, 2010).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_year_fails_loudly() {
        let table = RawLoanTable::Legacy(vec![legacy_row()]);
        assert_eq!(
            clean_loans(&table, 2024),
            Err(AffordError::UnsupportedSchemaYear(2024))
        );
    }

    #[test]
    fn test_family_mismatch() {
        let table = RawLoanTable::Legacy(vec![legacy_row()]);
        assert_eq!(
            clean_loans(&table, 2019),
            Err(AffordError::SchemaMismatch {
                year: 2019,
                expected: SchemaFamily::Modern,
                got: SchemaFamily::Legacy,
            })
        );
    }

    #[test]
    fn test_county_index_bridges_modern_records() {
        let legacy = clean_loans(&RawLoanTable::Legacy(vec![legacy_row()]), 2010).unwrap();
        let index = county_name_index(&legacy);

        let mut modern = clean_loans(&RawLoanTable::Modern(vec![modern_row()]), 2019).unwrap();
        attach_county_names(&mut modern, &index);

        assert_eq!(modern[0].county_name.as_deref(), Some("Fresno County"));
    }
}
