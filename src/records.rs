//! Data types used by the affordability pipeline.

use serde::{Deserialize, Deserializer, Serialize};

/// A loan normalized from either HMDA schema family.
///
/// One record per originated, first-lien, owner-occupied, home-purchase
/// loan. Amounts are in dollars, not thousands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_amount: f64,
    pub applicant_income: f64,
    pub county_code: u32,
    /// Present natively in legacy rows; attached from a county index for
    /// modern rows, which only carry the FIPS code.
    pub county_name: Option<String>,
    /// Modern schema only.
    pub property_value: Option<f64>,
}

/// A raw row from the 2018+ HMDA LAR schema, as read from CSV.
///
/// Extra columns in the source file are ignored; numeric cells holding
/// "NA" or blanks deserialize to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModernLoanRow {
    pub derived_loan_product_type: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub business_or_commercial_purpose: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub loan_purpose: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub occupancy_type: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub action_taken: Option<i64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub loan_amount: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub property_value: Option<f64>,
    /// Reported in thousands of dollars.
    #[serde(deserialize_with = "lenient_f64")]
    pub income: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub county_code: Option<f64>,
}

/// A raw row from the 2007-2017 HMDA LAR schema, as read from CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyLoanRow {
    #[serde(deserialize_with = "lenient_i64")]
    pub owner_occupancy: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub loan_purpose: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub action_taken: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub lien_status: Option<i64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub loan_amount_000s: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub applicant_income_000s: Option<f64>,
    pub county_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub county_code: Option<f64>,
}

/// A raw row of the county AMI reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAmiRow {
    #[serde(rename = "County_Name")]
    pub county_name: String,
    pub year: u16,
    #[serde(rename = "80%_AMI")]
    pub ami_80: f64,
    #[serde(rename = "120%_AMI")]
    pub ami_120: f64,
}

/// Deserializes a numeric cell, mapping blanks and non-numeric markers
/// like "NA" or "Exempt" to `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<i64>().ok()))
}
