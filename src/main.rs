//! CLI entry point for the HMDA affordability report tool.
//!
//! Provides subcommands for building the two-year county change report and
//! for inspecting per-county affordability counts for a single year.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hmda_affordability::{
    aggregate::{affordability_by_county, change_in_count, merge_years, ZeroCounts},
    ami::{split_by_year, Band},
    filter::{attach_county_names, clean_loans, county_name_index},
    ingest::{read_ami, read_legacy_loans, read_modern_loans},
    output::{log_deltas, print_json, write_change_csv, write_counts_csv},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hmda_affordability")]
#[command(about = "County-level housing affordability change from HMDA data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the 2010 vs 2019 change report for one AMI band
    Report {
        /// 2010 LAR CSV (legacy schema)
        #[arg(long, value_name = "CSV")]
        loans_2010: PathBuf,

        /// 2019 LAR CSV (modern schema)
        #[arg(long, value_name = "CSV")]
        loans_2019: PathBuf,

        /// County AMI reference CSV covering both years
        #[arg(long, value_name = "CSV")]
        ami: PathBuf,

        /// AMI band, e.g. "80% AMI", "100% AMI", "120% AMI"
        #[arg(short, long, default_value = "120% AMI")]
        band: String,

        /// How to treat counties with zero affordable loans
        #[arg(long, value_enum, default_value = "drop")]
        zero_counts: ZeroCounts,

        /// CSV file to write the change report to
        #[arg(short, long, default_value = "change_report.csv")]
        output: PathBuf,
    },
    /// Per-county affordability counts for a single year
    Counts {
        /// LAR CSV for the chosen year
        #[arg(long, value_name = "CSV")]
        loans: PathBuf,

        /// County AMI reference CSV
        #[arg(long, value_name = "CSV")]
        ami: PathBuf,

        /// Snapshot year (2010 or 2019)
        #[arg(short, long)]
        year: u16,

        /// AMI band
        #[arg(short, long, default_value = "120% AMI")]
        band: String,

        /// Optional legacy LAR CSV used to map county codes to names when
        /// the chosen year's schema carries codes only
        #[arg(long, value_name = "CSV")]
        county_source: Option<PathBuf>,

        /// CSV file to write the counts to
        #[arg(short, long, default_value = "county_counts.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            loans_2010,
            loans_2019,
            ami,
            band,
            zero_counts,
            output,
        } => report(&loans_2010, &loans_2019, &ami, &band, zero_counts, &output),
        Commands::Counts {
            loans,
            ami,
            year,
            band,
            county_source,
            output,
        } => counts(&loans, &ami, year, &band, county_source.as_deref(), &output),
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard must stay alive for the whole run or buffered log
/// lines are lost.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/hmda_affordability.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hmda_affordability.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

#[tracing::instrument(skip_all, fields(band = band_label))]
fn report(
    loans_2010: &Path,
    loans_2019: &Path,
    ami: &Path,
    band_label: &str,
    zero_counts: ZeroCounts,
    output: &Path,
) -> Result<()> {
    let band = Band::parse(band_label)?;

    let legacy = read_legacy_loans(loans_2010)?;
    let modern = read_modern_loans(loans_2019)?;
    let ami_tables = split_by_year(read_ami(ami)?);

    let records_2010 = clean_loans(&legacy, 2010)?;
    let mut records_2019 = clean_loans(&modern, 2019)?;
    info!(
        loans_2010 = records_2010.len(),
        loans_2019 = records_2019.len(),
        "Loan records cleaned"
    );

    // The modern schema carries FIPS codes only; bridge to county names
    // through the legacy snapshot.
    let index = county_name_index(&records_2010);
    attach_county_names(&mut records_2019, &index);

    let report_2010 = affordability_by_county(
        &records_2010,
        ami_tables.for_year(2010)?,
        band,
        2010,
        zero_counts,
    )?;
    let report_2019 = affordability_by_county(
        &records_2019,
        ami_tables.for_year(2019)?,
        band,
        2019,
        zero_counts,
    )?;

    let deltas = change_in_count(&report_2019, &report_2010);
    log_deltas(&deltas);

    let change = merge_years(&report_2010, &report_2019)?;
    print_json(&change)?;
    write_change_csv(output, &change)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        counties = change.rows.len(),
        output = %output.display(),
        "Change report written"
    );
    Ok(())
}

#[tracing::instrument(skip_all, fields(year = year, band = band_label))]
fn counts(
    loans: &Path,
    ami: &Path,
    year: u16,
    band_label: &str,
    county_source: Option<&Path>,
    output: &Path,
) -> Result<()> {
    use hmda_affordability::filter::SchemaFamily;

    let band = Band::parse(band_label)?;

    let table = match SchemaFamily::for_year(year)? {
        SchemaFamily::Legacy => read_legacy_loans(loans)?,
        SchemaFamily::Modern => read_modern_loans(loans)?,
    };
    let mut records = clean_loans(&table, year)?;

    if let Some(source) = county_source {
        let source_records = clean_loans(&read_legacy_loans(source)?, 2010)?;
        attach_county_names(&mut records, &county_name_index(&source_records));
    }

    let ami_tables = split_by_year(read_ami(ami)?);
    let report = affordability_by_county(
        &records,
        ami_tables.for_year(year)?,
        band,
        year,
        ZeroCounts::Keep,
    )?;

    write_counts_csv(output, &report)?;
    info!(
        counties = report.counties.len(),
        output = %output.display(),
        "County counts written"
    );
    Ok(())
}
