pub mod aggregate;
pub mod ami;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod output;
pub mod records;
