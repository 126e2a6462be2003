//! Error taxonomy for the affordability pipeline.

use thiserror::Error;

use crate::filter::SchemaFamily;

/// Errors surfaced by the filtering, model, and aggregation stages.
///
/// Rows with missing fields are not errors; they are dropped during
/// filtering and counted in a debug log line.
#[derive(Debug, Error, PartialEq)]
pub enum AffordError {
    #[error("no loan schema defined for year {0}")]
    UnsupportedSchemaYear(u16),

    #[error("raw table holds {got:?} rows but year {year} uses the {expected:?} schema")]
    SchemaMismatch {
        year: u16,
        expected: SchemaFamily,
        got: SchemaFamily,
    },

    #[error("no interest rate configured for year {0}")]
    UnsupportedModelYear(u16),

    #[error("unknown AMI band column {0:?}")]
    UnknownBand(String),

    #[error("non-finite income {0} in AMI reference data")]
    NonFiniteIncome(f64),

    #[error("county {0:?} has a zero baseline percentage, percent change is undefined")]
    ZeroBaseline(String),
}
